//! Client-side request signing.
//!
//! [`RequestSigner`] produces the four protocol headers for an outgoing
//! request. It renders the same canonical message the server rebuilds, so a
//! request signed here verifies as long as method, path, query and body are
//! sent unchanged.

use chrono::{DateTime, Utc};

use crate::canonical::build_canonical_message;
use crate::credentials::SecretKey;
use crate::envelope::{
    CLIENT_ID_HEADER, DATE_HEADER, NONCE_HEADER, SIGNATURE_HEADER, format_http_date,
};
use crate::signature::sign;

/// Signs requests on behalf of one client.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    client_id: String,
    secret: SecretKey,
}

/// Header values produced for one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value for `x-client-id`.
    pub client_id: String,
    /// Value for `x-date`.
    pub date: String,
    /// Value for `x-nonce`.
    pub nonce: String,
    /// Value for `x-signature`.
    pub signature: String,
}

impl SignedHeaders {
    /// The headers as `(name, value)` pairs.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            (CLIENT_ID_HEADER, self.client_id.as_str()),
            (DATE_HEADER, self.date.as_str()),
            (NONCE_HEADER, self.nonce.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
        ]
    }

    /// Insert the headers into a header map, replacing existing values.
    ///
    /// # Errors
    ///
    /// Fails if a value is not valid header text, which can only happen for a
    /// client id or nonce containing control characters.
    pub fn apply(&self, headers: &mut http::HeaderMap) -> Result<(), http::header::InvalidHeaderValue> {
        for (name, value) in self.pairs() {
            headers.insert(name, http::HeaderValue::from_str(value)?);
        }
        Ok(())
    }
}

impl RequestSigner {
    /// Create a signer for `client_id` holding `secret`.
    pub fn new(client_id: impl Into<String>, secret: impl Into<SecretKey>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
        }
    }

    /// Sign a request now, with a fresh random nonce.
    #[must_use]
    pub fn sign(&self, method: &str, path: &str, query: &str, body: &[u8]) -> SignedHeaders {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        self.sign_at(method, path, query, body, Utc::now(), &nonce)
    }

    /// Sign a request with an explicit timestamp and nonce.
    #[must_use]
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        query: &str,
        body: &[u8],
        at: DateTime<Utc>,
        nonce: &str,
    ) -> SignedHeaders {
        let date = format_http_date(at);
        let canonical = build_canonical_message(method, path, query, &date, nonce, body);

        SignedHeaders {
            client_id: self.client_id.clone(),
            signature: sign(self.secret.expose(), &canonical),
            date,
            nonce: nonce.to_owned(),
        }
    }
}
