//! HMAC-SHA256 signing and constant-time signature comparison.
//!
//! Signatures travel as standard (padded) base64 in the `x-signature` header.
//! This module knows nothing about HTTP, nonces or replay; it operates on
//! opaque byte strings only.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of a raw HMAC-SHA256 digest.
pub const SIGNATURE_LEN: usize = 32;

/// Compute the raw HMAC-SHA256 of `canonical` keyed with `secret`.
#[must_use]
pub fn sign_raw(secret: &[u8], canonical: &str) -> [u8; SIGNATURE_LEN] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can accept keys of any length");
    mac.update(canonical.as_bytes());
    let mut out = [0u8; SIGNATURE_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Sign a canonical message and return the base64 transport encoding.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::signature::{sign, verify};
///
/// let sig = sign(b"s1", "GET\n/\n\nts\nn\n");
/// assert!(verify(&sig, &sig));
/// ```
#[must_use]
pub fn sign(secret: &[u8], canonical: &str) -> String {
    STANDARD.encode(sign_raw(secret, canonical))
}

/// Compare an expected signature with a supplied one in constant time.
///
/// Both values are base64 encoded. If either fails to decode, a zeroed buffer
/// of digest length takes its place so that the comparison still runs, and the
/// result is `false`.
#[must_use]
pub fn verify(expected: &str, supplied: &str) -> bool {
    let (expected, expected_ok) = decode_or_zeroed(expected);
    let (supplied, supplied_ok) = decode_or_zeroed(supplied);

    let matches = expected.as_slice().ct_eq(supplied.as_slice());
    bool::from(matches & expected_ok.ct_eq(&1u8) & supplied_ok.ct_eq(&1u8))
}

/// Compare a raw expected digest against a base64-encoded supplied signature.
///
/// Used on the verification path, where the expected digest is already held
/// as bytes.
#[must_use]
pub fn verify_raw(expected: &[u8; SIGNATURE_LEN], supplied: &str) -> bool {
    let (supplied, supplied_ok) = decode_or_zeroed(supplied);
    bool::from(expected.as_slice().ct_eq(supplied.as_slice()) & supplied_ok.ct_eq(&1u8))
}

/// Decode a base64 signature into a fixed-size buffer.
///
/// Returns the buffer and `1` on success. Values that do not decode, or decode
/// to the wrong length, yield a zeroed buffer and `0`.
fn decode_or_zeroed(encoded: &str) -> ([u8; SIGNATURE_LEN], u8) {
    let mut buf = [0u8; SIGNATURE_LEN];
    match STANDARD.decode(encoded.trim()) {
        Ok(bytes) if bytes.len() == SIGNATURE_LEN => {
            buf.copy_from_slice(&bytes);
            (buf, 1)
        }
        _ => (buf, 0),
    }
}
