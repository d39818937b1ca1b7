//! Response construction.
//!
//! Every authentication failure produces the same `401` body so that callers
//! cannot tell rejection reasons apart.

use bytes::Bytes;
use http_body_util::Full;

/// The response type produced by the service and its handlers.
pub type GateResponse = http::Response<Full<Bytes>>;

/// Content type for all JSON responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Authentication scheme advertised in `WWW-Authenticate`.
pub const AUTH_SCHEME: &str = "Hmac";

/// Build a JSON response with the given status.
#[must_use]
pub fn json_response(status: http::StatusCode, value: &serde_json::Value) -> GateResponse {
    let json = serde_json::to_vec(value).expect("JSON serialization of a Value cannot fail");
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(Full::new(Bytes::from(json)))
        .expect("valid JSON response")
}

/// Build a `{"message": ...}` response.
#[must_use]
pub fn message_response(status: http::StatusCode, message: &str) -> GateResponse {
    json_response(status, &serde_json::json!({ "message": message }))
}

/// The generic response for any authentication rejection.
#[must_use]
pub fn unauthorized() -> GateResponse {
    let mut response = message_response(http::StatusCode::UNAUTHORIZED, "authentication failed");
    response.headers_mut().insert(
        http::header::WWW_AUTHENTICATE,
        http::HeaderValue::from_static(AUTH_SCHEME),
    );
    response
}

/// The response for an authenticated caller lacking the required role.
#[must_use]
pub fn forbidden() -> GateResponse {
    message_response(http::StatusCode::FORBIDDEN, "forbidden")
}

/// The response for an unknown route.
#[must_use]
pub fn not_found() -> GateResponse {
    message_response(http::StatusCode::NOT_FOUND, "not found")
}

/// The response when the request body cannot be read.
#[must_use]
pub fn bad_request(message: &str) -> GateResponse {
    message_response(http::StatusCode::BAD_REQUEST, message)
}
