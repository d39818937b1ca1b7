//! Canonical message construction.
//!
//! Client and server each render the protected parts of a request into the
//! same newline-separated string:
//!
//! ```text
//! HTTPRequestMethod\n
//! Path\n
//! ?RawQueryString\n
//! Timestamp\n
//! Nonce\n
//! HexEncodedBodyDigest
//! ```
//!
//! The query field keeps its leading `?` (`?id=7`), or is empty when the
//! request has no query. The body digest is the lower-case hex SHA-256 of the
//! body, or the empty string when the body is empty.

use sha2::{Digest, Sha256};

/// Build the canonical message from its components.
///
/// The method is upper-cased. The path and query are used exactly as received.
/// `query` is the raw query without its `?` (as returned by
/// [`http::Uri::query`]); pass an empty query when the request has none.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::canonical::build_canonical_message;
///
/// let canonical = build_canonical_message(
///     "get",
///     "/api/products/getAll",
///     "",
///     "Mon, 19 Oct 2026 10:00:00 GMT",
///     "3f2a9c",
///     b"",
/// );
/// assert_eq!(
///     canonical,
///     "GET\n/api/products/getAll\n\nMon, 19 Oct 2026 10:00:00 GMT\n3f2a9c\n"
/// );
/// ```
#[must_use]
pub fn build_canonical_message(
    method: &str,
    path: &str,
    query: &str,
    timestamp: &str,
    nonce: &str,
    body: &[u8],
) -> String {
    let method = method.to_ascii_uppercase();
    let body_digest = hash_body(body);
    let query = query_field(query);

    format!("{method}\n{path}\n{query}\n{timestamp}\n{nonce}\n{body_digest}")
}

fn query_field(query: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        String::new()
    } else {
        format!("?{query}")
    }
}

/// Compute the body digest field of the canonical message.
///
/// Returns the lower-case hex SHA-256 of `body`, or an empty string for an
/// empty body (not the digest of zero bytes).
///
/// # Examples
///
/// ```
/// use hmacgate_auth::canonical::hash_body;
///
/// assert_eq!(hash_body(b""), "");
/// assert_eq!(hash_body(b"{}").len(), 64);
/// ```
#[must_use]
pub fn hash_body(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }
    hex::encode(Sha256::digest(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "Mon, 19 Oct 2026 10:00:00 GMT";

    #[test]
    fn test_should_join_six_fields_in_fixed_order() {
        let canonical = build_canonical_message("POST", "/api/products/create", "a=1", TS, "n1", b"x");
        let fields: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], "POST");
        assert_eq!(fields[1], "/api/products/create");
        assert_eq!(fields[2], "?a=1");
        assert_eq!(fields[3], TS);
        assert_eq!(fields[4], "n1");
        assert_eq!(fields[5], hash_body(b"x"));
    }

    #[test]
    fn test_should_uppercase_method() {
        let lower = build_canonical_message("delete", "/p", "", TS, "n", b"");
        let upper = build_canonical_message("DELETE", "/p", "", TS, "n", b"");
        assert_eq!(lower, upper);
        assert!(lower.starts_with("DELETE\n"));
    }

    #[test]
    fn test_should_use_empty_digest_for_empty_body() {
        assert_eq!(hash_body(b""), "");
        let canonical = build_canonical_message("GET", "/", "", TS, "n", b"");
        assert!(canonical.ends_with("\nn\n"));
    }

    #[test]
    fn test_should_hash_nonempty_body_as_lowercase_hex() {
        // SHA-256("abc")
        assert_eq!(
            hash_body(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_should_distinguish_empty_and_nonempty_bodies() {
        let empty = build_canonical_message("POST", "/p", "", TS, "n", b"");
        let full = build_canonical_message("POST", "/p", "", TS, "n", b"{}");
        assert_ne!(empty, full);
    }

    #[test]
    fn test_should_preserve_path_and_query_verbatim() {
        let canonical =
            build_canonical_message("PUT", "/api/products/update", "id=7&&update=x%20y", TS, "n", b"");
        assert!(canonical.contains("\n/api/products/update\n?id=7&&update=x%20y\n"));
    }

    #[test]
    fn test_should_render_query_with_single_leading_question_mark() {
        let bare = build_canonical_message("GET", "/p", "id=7", TS, "n", b"");
        let prefixed = build_canonical_message("GET", "/p", "?id=7", TS, "n", b"");
        assert_eq!(bare, prefixed);
        assert_eq!(bare, format!("GET\n/p\n?id=7\n{TS}\nn\n"));

        let none = build_canonical_message("GET", "/p", "", TS, "n", b"");
        let lone_mark = build_canonical_message("GET", "/p", "?", TS, "n", b"");
        assert_eq!(none, lone_mark);
        assert_eq!(none, format!("GET\n/p\n\n{TS}\nn\n"));
    }
}
