//! Request verification.
//!
//! [`HmacVerifier::verify`] runs one request through the full decision:
//!
//! 1. Extract `x-client-id`, `x-date`, `x-nonce` and `x-signature`.
//! 2. Parse `x-date` and check it against the clock skew tolerance (inclusive).
//! 3. Reject a nonce already accepted for this client.
//! 4. Resolve the client's credential, bounded by the resolver timeout.
//! 5. Rebuild the canonical message from the request and body.
//! 6. Compute the expected signature and compare it in constant time.
//! 7. Claim the nonce in the replay guard. Losing that race is a replay.
//! 8. Return the authenticated [`Principal`].
//!
//! The nonce is only recorded after the signature has been verified, so a
//! forged request cannot burn a legitimate client's nonce.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::canonical::build_canonical_message;
use crate::clock::{Clock, SystemClock};
use crate::config::VerifierConfig;
use crate::credentials::CredentialResolver;
use crate::envelope::SignedRequestEnvelope;
use crate::error::{ResolveError, Rejection};
use crate::replay::ReplayGuard;
use crate::signature::{sign_raw, verify_raw};

/// The identity established by a successfully verified request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    /// The authenticated client id.
    pub client_id: String,
    /// The role bound to the client's credential.
    pub role: String,
}

impl Principal {
    /// Whether the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// Outcome of verifying one request.
pub type VerificationOutcome = Result<Principal, Rejection>;

/// Verifies HMAC-signed requests against a credential resolver.
///
/// Cheap to share behind an `Arc`; all state lives in the replay guard.
pub struct HmacVerifier {
    resolver: Arc<dyn CredentialResolver>,
    replay: Arc<ReplayGuard>,
    clock: Arc<dyn Clock>,
    config: VerifierConfig,
}

impl HmacVerifier {
    /// Create a verifier on the wall clock with a fresh replay guard.
    pub fn new(resolver: Arc<dyn CredentialResolver>, config: VerifierConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let replay = Arc::new(ReplayGuard::with_clock(Arc::clone(&clock)));
        Self::with_parts(resolver, replay, clock, config)
    }

    /// Create a verifier from explicitly supplied components.
    ///
    /// The replay guard should share `clock` so that skew checks and nonce
    /// expiry agree on the current time.
    pub fn with_parts(
        resolver: Arc<dyn CredentialResolver>,
        replay: Arc<ReplayGuard>,
        clock: Arc<dyn Clock>,
        config: VerifierConfig,
    ) -> Self {
        Self {
            resolver,
            replay,
            clock,
            config,
        }
    }

    /// The replay guard, for periodic sweeping by the host.
    #[must_use]
    pub fn replay_guard(&self) -> &Arc<ReplayGuard> {
        &self.replay
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify one request.
    ///
    /// `body` must be the exact bytes received. Every failure is returned as a
    /// [`Rejection`]; nothing here panics on client input.
    pub async fn verify(&self, parts: &http::request::Parts, body: &[u8]) -> VerificationOutcome {
        let outcome = self.run(parts, body).await;

        match &outcome {
            Ok(principal) => debug!(
                client_id = %principal.client_id,
                role = %principal.role,
                "request authenticated"
            ),
            // Logged at `error` where the resolver failed, with its cause.
            Err(rejection) if rejection.is_dependency_failure() => {}
            Err(rejection) => warn!(
                reason = rejection.as_str(),
                method = %parts.method,
                path = parts.uri.path(),
                "request rejected"
            ),
        }

        outcome
    }

    async fn run(&self, parts: &http::request::Parts, body: &[u8]) -> VerificationOutcome {
        let envelope = SignedRequestEnvelope::from_headers(&parts.headers)?;

        let sent_at = envelope.parsed_timestamp()?;
        let skew = (self.clock.now() - sent_at).abs();
        if skew > self.config.clock_skew_tolerance {
            debug!(
                client_id = %envelope.client_id,
                skew_seconds = skew.num_seconds(),
                "timestamp outside tolerance"
            );
            return Err(Rejection::ClockSkew);
        }

        if self.replay.seen(&envelope.client_id, &envelope.nonce) {
            return Err(Rejection::Replay);
        }

        let credential = match tokio::time::timeout(
            self.config.resolver_timeout,
            self.resolver.resolve(&envelope.client_id),
        )
        .await
        {
            Ok(Ok(Some(credential))) => credential,
            Ok(Ok(None)) => return Err(Rejection::UnknownClient),
            Ok(Err(e)) => return Err(dependency_failure(parts, &envelope.client_id, &e)),
            Err(_) => {
                let e = ResolveError::Timeout(self.config.resolver_timeout);
                return Err(dependency_failure(parts, &envelope.client_id, &e));
            }
        };

        let canonical = build_canonical_message(
            parts.method.as_str(),
            parts.uri.path(),
            parts.uri.query().unwrap_or(""),
            &envelope.timestamp,
            &envelope.nonce,
            body,
        );
        let expected = sign_raw(credential.secret.expose(), &canonical);

        if !verify_raw(&expected, &envelope.signature) {
            return Err(Rejection::BadSignature);
        }

        if !self
            .replay
            .record(&envelope.client_id, &envelope.nonce, self.config.replay_window)
        {
            debug!(client_id = %envelope.client_id, "lost nonce race to a concurrent request");
            return Err(Rejection::Replay);
        }

        Ok(Principal {
            client_id: credential.client_id,
            role: credential.role,
        })
    }
}

fn dependency_failure(
    parts: &http::request::Parts,
    client_id: &str,
    cause: &ResolveError,
) -> Rejection {
    let rejection = Rejection::ResolverUnavailable;
    error!(
        reason = rejection.as_str(),
        client_id = %client_id,
        method = %parts.method,
        path = parts.uri.path(),
        error = %cause,
        "authentication aborted by dependency failure"
    );
    rejection
}

impl std::fmt::Debug for HmacVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacVerifier")
            .field("replay", &self.replay)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
