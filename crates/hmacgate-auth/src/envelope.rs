//! Protocol headers and their extraction from a request.

use chrono::{DateTime, Utc};

use crate::error::Rejection;

/// Header carrying the client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";
/// Header carrying the RFC 1123 request timestamp.
pub const DATE_HEADER: &str = "x-date";
/// Header carrying the per-request nonce.
pub const NONCE_HEADER: &str = "x-nonce";
/// Header carrying the base64 HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// The authentication fields of one request, as sent by the client.
///
/// `timestamp` keeps the raw header text because the canonical message signs
/// the string exactly as transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestEnvelope {
    /// Value of `x-client-id`.
    pub client_id: String,
    /// Raw value of `x-date`.
    pub timestamp: String,
    /// Value of `x-nonce`.
    pub nonce: String,
    /// Value of `x-signature`.
    pub signature: String,
}

impl SignedRequestEnvelope {
    /// Extract the four protocol headers.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::MissingHeaders`] if any header is absent, empty, or
    /// not visible ASCII.
    pub fn from_headers(headers: &http::HeaderMap) -> Result<Self, Rejection> {
        Ok(Self {
            client_id: required_header(headers, CLIENT_ID_HEADER)?,
            timestamp: required_header(headers, DATE_HEADER)?,
            nonce: required_header(headers, NONCE_HEADER)?,
            signature: required_header(headers, SIGNATURE_HEADER)?,
        })
    }

    /// Parse the timestamp into a UTC instant.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::MalformedTimestamp`] if the value is neither
    /// RFC 1123/2822 nor RFC 3339.
    pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>, Rejection> {
        parse_http_date(&self.timestamp).ok_or(Rejection::MalformedTimestamp)
    }
}

/// Parse an RFC 1123 date (`Mon, 19 Oct 2026 10:00:00 GMT`), falling back to
/// RFC 3339.
#[must_use]
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format an instant as an RFC 1123 date in GMT.
#[must_use]
pub fn format_http_date(instant: DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn required_header(headers: &http::HeaderMap, name: &str) -> Result<String, Rejection> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
        .ok_or(Rejection::MissingHeaders)
}
