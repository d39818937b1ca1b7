//! HMAC-authenticating HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use tracing::{Instrument, debug, info_span, warn};

use hmacgate_auth::HmacVerifier;

use crate::dispatch::{AuthenticatedRequest, ProtectedHandler};
use crate::response::{GateResponse, bad_request, forbidden, unauthorized};

/// Configuration for the authenticating service.
#[derive(Debug, Clone, Default)]
pub struct HmacHttpConfig {
    /// Role every verified caller must hold. `None` admits any verified caller.
    pub required_role: Option<String>,
}

/// Hyper `Service` that verifies each request before handing it to a
/// [`ProtectedHandler`].
///
/// The body is buffered once, verified against the signature, and then passed
/// on unchanged.
#[derive(Debug)]
pub struct HmacHttpService<H: ProtectedHandler> {
    handler: Arc<H>,
    verifier: Arc<HmacVerifier>,
    config: Arc<HmacHttpConfig>,
}

impl<H: ProtectedHandler> HmacHttpService<H> {
    /// Create a new service.
    pub fn new(handler: Arc<H>, verifier: Arc<HmacVerifier>, config: HmacHttpConfig) -> Self {
        Self {
            handler,
            verifier,
            config: Arc::new(config),
        }
    }

    /// The verifier guarding this service.
    #[must_use]
    pub fn verifier(&self) -> &Arc<HmacVerifier> {
        &self.verifier
    }
}

impl<H: ProtectedHandler> Clone for HmacHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            verifier: Arc::clone(&self.verifier),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H, B> hyper::service::Service<http::Request<B>> for HmacHttpService<H>
where
    H: ProtectedHandler,
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    type Response = GateResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let verifier = Arc::clone(&self.verifier);
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("request", request_id = %request_id);

        Box::pin(
            async move {
                let response = process_request(req, handler.as_ref(), &verifier, &config).await;
                Ok(add_common_headers(response, &request_id))
            }
            .instrument(span),
        )
    }
}

/// Process a single request through the full pipeline.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    verifier: &HmacVerifier,
    config: &HmacHttpConfig,
) -> GateResponse
where
    H: ProtectedHandler,
    B: http_body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, incoming) = req.into_parts();

    // 1. Collect body.
    let body = match collect_body(incoming).await {
        Ok(body) => body,
        Err(message) => {
            warn!(error = %message, "failed to read request body");
            return bad_request("failed to read request body");
        }
    };

    // 2. Authenticate.
    let principal = match verifier.verify(&parts, &body).await {
        Ok(principal) => principal,
        Err(_) => return unauthorized(),
    };

    // 3. Authorize.
    if let Some(ref role) = config.required_role {
        if !principal.has_role(role) {
            warn!(
                client_id = %principal.client_id,
                role = %principal.role,
                required = %role,
                "caller lacks required role"
            );
            return forbidden();
        }
    }

    // 4. Dispatch to handler.
    debug!(client_id = %principal.client_id, path = parts.uri.path(), "dispatching request");
    handler
        .handle(AuthenticatedRequest {
            parts,
            body,
            principal,
        })
        .await
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body<B>(incoming: B) -> Result<Bytes, String>
where
    B: http_body::Body,
    B::Error: std::fmt::Display,
{
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| e.to_string())
}

/// Add common response headers to every response.
fn add_common_headers(mut response: GateResponse, request_id: &str) -> GateResponse {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-request-id").or_insert(hv);
    }
    headers.insert("server", http::HeaderValue::from_static("hmacgate"));

    response
}
