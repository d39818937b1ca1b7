//! The protected API behind HMAC authentication.

use std::future::Future;
use std::pin::Pin;

use hmacgate_http::response::{json_response, not_found};
use hmacgate_http::{AuthenticatedRequest, GateResponse, ProtectedHandler};

/// Serves `GET /api/whoami`, which reports the authenticated principal.
#[derive(Debug, Clone, Default)]
pub struct ApiHandler;

impl ProtectedHandler for ApiHandler {
    fn handle(
        &self,
        request: AuthenticatedRequest,
    ) -> Pin<Box<dyn Future<Output = GateResponse> + Send>> {
        Box::pin(async move { route(&request) })
    }
}

fn route(request: &AuthenticatedRequest) -> GateResponse {
    match (&request.parts.method, request.parts.uri.path()) {
        (&http::Method::GET, "/api/whoami") => json_response(
            http::StatusCode::OK,
            &serde_json::json!({
                "clientId": request.principal.client_id,
                "role": request.principal.role,
            }),
        ),
        _ => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use hmacgate_auth::Principal;

    use super::*;

    fn authenticated(method: http::Method, path: &str) -> AuthenticatedRequest {
        let (parts, ()) = http::Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
            .into_parts();
        AuthenticatedRequest {
            parts,
            body: Bytes::new(),
            principal: Principal {
                client_id: "c1".to_owned(),
                role: "ProductManager".to_owned(),
            },
        }
    }

    #[test]
    fn test_should_report_principal_on_whoami() {
        let response = route(&authenticated(http::Method::GET, "/api/whoami"));
        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[test]
    fn test_should_return_not_found_for_other_paths() {
        let response = route(&authenticated(http::Method::GET, "/api/products/getAll"));
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);

        let response = route(&authenticated(http::Method::POST, "/api/whoami"));
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }
}
