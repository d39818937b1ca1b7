//! HMAC-SHA256 shared-secret request authentication for hmacgate.
//!
//! This crate verifies that an inbound HTTP request was produced, unmodified
//! and recently, by a holder of a pre-shared secret, and refuses any replayed
//! copy of a request it already accepted.
//!
//! # Overview
//!
//! A client signs each request with four headers: `x-client-id`, `x-date`
//! (RFC 1123), `x-nonce` and `x-signature`. The signature is
//! `base64(HMAC-SHA256(secret, canonical))` over the canonical message
//! `METHOD\nPATH\nQUERY\nDATE\nNONCE\nBODY_SHA256_HEX`. The server rebuilds the
//! canonical message, compares signatures in constant time, enforces a clock
//! skew tolerance, and remembers accepted nonces for a replay window.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hmacgate_auth::{
//!     Credential, HmacVerifier, RequestSigner, StaticCredentialResolver, VerifierConfig,
//! };
//!
//! # tokio_test_block_on(async {
//! let resolver = StaticCredentialResolver::new(vec![Credential::new("c1", "s1", "ProductManager")]);
//! let verifier = HmacVerifier::new(Arc::new(resolver), VerifierConfig::default());
//!
//! let signed = RequestSigner::new("c1", "s1").sign("GET", "/api/products/getAll", "", b"");
//! let mut builder = http::Request::builder().uri("/api/products/getAll");
//! for (name, value) in signed.pairs() {
//!     builder = builder.header(name, value);
//! }
//! let (parts, ()) = builder.body(()).unwrap().into_parts();
//!
//! let principal = verifier.verify(&parts, b"").await.unwrap();
//! assert_eq!(principal.role, "ProductManager");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical message construction
//! - [`signature`] - HMAC-SHA256 signing and constant-time comparison
//! - [`replay`] - Replay guard with per-entry expiry
//! - [`credentials`] - Credential resolver trait and in-memory implementation
//! - [`envelope`] - Protocol header names and extraction
//! - [`clock`] - Injectable time source
//! - [`config`] - Verifier configuration
//! - [`error`] - Rejection reasons and resolver errors
//! - [`signer`] - Client-side request signing
//! - [`verifier`] - The verification pipeline

pub mod canonical;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod replay;
pub mod signature;
pub mod signer;
pub mod verifier;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::VerifierConfig;
pub use credentials::{Credential, CredentialResolver, SecretKey, StaticCredentialResolver};
pub use envelope::SignedRequestEnvelope;
pub use error::{Rejection, ResolveError};
pub use replay::ReplayGuard;
pub use signer::{RequestSigner, SignedHeaders};
pub use verifier::{HmacVerifier, Principal, VerificationOutcome};
