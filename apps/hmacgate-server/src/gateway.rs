//! Gateway service in front of the authenticated API.
//!
//! Health-check endpoints (`/health`, `/_health`) are answered at the gateway
//! level without authentication. Everything else goes through the HMAC
//! service.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::Service;

use hmacgate_http::{GateResponse, HmacHttpService, ProtectedHandler};

/// Gateway that routes health checks locally and everything else through
/// HMAC authentication.
#[derive(Debug)]
pub struct GatewayService<H: ProtectedHandler> {
    api: HmacHttpService<H>,
}

impl<H: ProtectedHandler> GatewayService<H> {
    /// Create a new gateway wrapping the authenticated API service.
    pub fn new(api: HmacHttpService<H>) -> Self {
        Self { api }
    }
}

impl<H: ProtectedHandler> Clone for GatewayService<H> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

impl<H: ProtectedHandler> Service<http::Request<Incoming>> for GatewayService<H> {
    type Response = GateResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            let replay_entries = self.api.verifier().replay_guard().len();
            return Box::pin(async move { Ok(health_check_response(replay_entries)) });
        }

        let api = self.api.clone();
        Box::pin(async move { api.call(req).await })
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

/// Produce the health check response.
fn health_check_response(replay_entries: usize) -> GateResponse {
    let body = serde_json::json!({
        "status": "running",
        "replayEntries": replay_entries,
    });
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("static health response should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_detect_health_check_paths() {
        assert!(is_health_check(&http::Method::GET, "/_health"));
        assert!(is_health_check(&http::Method::GET, "/health"));
        assert!(!is_health_check(&http::Method::POST, "/_health"));
        assert!(!is_health_check(&http::Method::GET, "/api/whoami"));
    }

    #[test]
    fn test_should_produce_health_check_response() {
        let resp = health_check_response(3);
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("Content-Type")
                .and_then(|v| v.to_str().ok()),
            Some("application/json"),
        );
    }
}
