//! Error types for HMAC request authentication.
//!
//! [`Rejection`] is the closed set of reasons a request can fail verification.
//! Hosts must answer every variant with the same generic unauthorized response;
//! the specific reason is for logs only.

/// Why a request was not authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Rejection {
    /// One of `x-client-id`, `x-date`, `x-nonce` or `x-signature` is absent
    /// or not valid header text.
    #[error("Missing HMAC headers")]
    MissingHeaders,

    /// The `x-date` header could not be parsed.
    #[error("Malformed x-date header")]
    MalformedTimestamp,

    /// The `x-date` header is outside the allowed clock skew.
    #[error("x-date outside allowed skew")]
    ClockSkew,

    /// The nonce was already accepted for this client within the replay window.
    #[error("Replay detected")]
    Replay,

    /// No credential exists for the client id.
    #[error("Unknown client id")]
    UnknownClient,

    /// The supplied signature does not match the request.
    #[error("Invalid signature")]
    BadSignature,

    /// The credential resolver failed or timed out.
    #[error("Credential resolver unavailable")]
    ResolverUnavailable,
}

impl Rejection {
    /// Whether this outcome reflects a failed dependency rather than a
    /// security decision about the request.
    #[must_use]
    pub fn is_dependency_failure(self) -> bool {
        matches!(self, Self::ResolverUnavailable)
    }

    /// Stable machine-readable name, suitable for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingHeaders => "MissingHeaders",
            Self::MalformedTimestamp => "MalformedTimestamp",
            Self::ClockSkew => "ClockSkew",
            Self::Replay => "Replay",
            Self::UnknownClient => "UnknownClient",
            Self::BadSignature => "BadSignature",
            Self::ResolverUnavailable => "ResolverUnavailable",
        }
    }
}

/// Failure of a [`CredentialResolver`](crate::credentials::CredentialResolver) lookup.
///
/// A missing client is not an error; resolvers return `Ok(None)` for that.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The backing store could not be reached.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// The lookup did not finish within the configured bound.
    #[error("credential lookup timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_flag_only_resolver_failure_as_dependency_failure() {
        let all = [
            Rejection::MissingHeaders,
            Rejection::MalformedTimestamp,
            Rejection::ClockSkew,
            Rejection::Replay,
            Rejection::UnknownClient,
            Rejection::BadSignature,
            Rejection::ResolverUnavailable,
        ];
        let flagged: Vec<_> = all.iter().filter(|r| r.is_dependency_failure()).collect();
        assert_eq!(flagged, vec![&Rejection::ResolverUnavailable]);
    }
}
