//! Handler trait for authenticated requests.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use hmacgate_auth::Principal;

use crate::response::GateResponse;

/// A request that passed HMAC verification.
#[derive(Debug)]
pub struct AuthenticatedRequest {
    /// Request line and headers.
    pub parts: http::request::Parts,
    /// The exact body bytes that were signed.
    pub body: Bytes,
    /// The verified caller.
    pub principal: Principal,
}

/// Business logic behind the authentication layer.
///
/// The handler is only ever invoked with requests that were verified and,
/// when configured, hold the required role.
pub trait ProtectedHandler: Send + Sync + 'static {
    /// Handle an authenticated request.
    fn handle(
        &self,
        request: AuthenticatedRequest,
    ) -> Pin<Box<dyn Future<Output = GateResponse> + Send>>;
}
