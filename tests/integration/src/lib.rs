//! Integration tests for the hmacgate server.
//!
//! These tests require a running server at `localhost:4566` started with a
//! client whose credentials match `HMAC_CLIENT_ID` / `HMAC_CLIENT_SECRET`
//! (both default to `test`). They are marked `#[ignore]` so they don't run
//! during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! HMAC_CLIENT_ID=test HMAC_CLIENT_SECRET=test cargo run -p hmacgate-server &
//! cargo test -p hmacgate-integration -- --ignored
//! ```

use std::sync::Once;

use hmacgate_auth::{RequestSigner, SignedHeaders};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("HMACGATE_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Signer for the client the server under test was started with.
#[must_use]
pub fn signer() -> RequestSigner {
    init_tracing();

    let client_id = std::env::var("HMAC_CLIENT_ID").unwrap_or_else(|_| "test".to_owned());
    let secret = std::env::var("HMAC_CLIENT_SECRET").unwrap_or_else(|_| "test".to_owned());
    RequestSigner::new(client_id, secret)
}

/// Build a request carrying the given signed headers.
pub fn signed_request(
    client: &reqwest::Client,
    method: reqwest::Method,
    path_and_query: &str,
    headers: &SignedHeaders,
) -> reqwest::RequestBuilder {
    let mut req = client.request(method, format!("{}{path_and_query}", endpoint_url()));
    for (name, value) in headers.pairs() {
        req = req.header(name, value);
    }
    req
}

mod test_auth;
mod test_health;
