//! Credential resolver trait and implementations.
//!
//! This module defines the [`CredentialResolver`] trait for looking up a
//! client's shared secret and role from its client id, along with a
//! [`StaticCredentialResolver`] that holds credentials loaded once at startup.

use std::collections::HashMap;
use std::fmt;

use crate::error::ResolveError;

/// A pre-shared secret.
///
/// The bytes never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The secret bytes, for use as an HMAC key.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// A client's identity, shared secret and authorization role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// The client identifier sent in `x-client-id`.
    pub client_id: String,
    /// The shared secret used as the HMAC key.
    pub secret: SecretKey,
    /// The role granted to requests signed with this credential.
    pub role: String,
}

impl Credential {
    /// Create a credential.
    pub fn new(
        client_id: impl Into<String>,
        secret: impl Into<SecretKey>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
            role: role.into(),
        }
    }
}

/// Looks up credentials by client id.
///
/// Implementations may back this with a database, configuration file, or a
/// remote secret store. Return `Ok(None)` for an unknown client and reserve
/// `Err` for failures of the store itself.
#[async_trait::async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve the credential for `client_id`.
    async fn resolve(&self, client_id: &str) -> Result<Option<Credential>, ResolveError>;
}

/// An in-memory credential store backed by a `HashMap`.
///
/// Loaded once and immutable afterwards.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::credentials::{Credential, StaticCredentialResolver};
///
/// let resolver = StaticCredentialResolver::new(vec![
///     Credential::new("manager-1", "pm-secret", "ProductManager"),
/// ]);
/// assert_eq!(resolver.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialResolver {
    credentials: HashMap<String, Credential>,
}

impl StaticCredentialResolver {
    /// Create a resolver from an iterable of credentials.
    ///
    /// A later credential with the same client id replaces an earlier one.
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            credentials: credentials
                .into_iter()
                .map(|c| (c.client_id.clone(), c))
                .collect(),
        }
    }

    /// Number of known clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether no clients are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[async_trait::async_trait]
impl CredentialResolver for StaticCredentialResolver {
    async fn resolve(&self, client_id: &str) -> Result<Option<Credential>, ResolveError> {
        Ok(self.credentials.get(client_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_should_return_credential_for_known_client() {
        let resolver =
            StaticCredentialResolver::new(vec![Credential::new("c1", "s1", "ProductManager")]);

        let credential = resolver.resolve("c1").await.unwrap().unwrap();
        assert_eq!(credential.client_id, "c1");
        assert_eq!(credential.secret.expose(), b"s1");
        assert_eq!(credential.role, "ProductManager");
    }

    #[tokio::test]
    async fn test_should_return_none_for_unknown_client() {
        let resolver = StaticCredentialResolver::new(vec![]);

        let result = resolver.resolve("UNKNOWN").await;
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_should_redact_secret_in_debug_output() {
        let credential = Credential::new("c1", "super-secret", "Reader");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("SecretKey(***)"));
    }
}
