//! HTTP service layer for hmacgate.
//!
//! This crate puts HMAC request authentication in front of arbitrary business
//! logic:
//!
//! - **Service**: Hyper `Service` that buffers the body, verifies the request
//!   and enforces an optional required role
//! - **Handler trait**: The boundary between authentication and business logic
//! - **Response helpers**: JSON responses, including the generic `401`

pub mod dispatch;
pub mod response;
pub mod service;

pub use dispatch::{AuthenticatedRequest, ProtectedHandler};
pub use response::GateResponse;
pub use service::{HmacHttpConfig, HmacHttpService};
