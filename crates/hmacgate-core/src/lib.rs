//! Core configuration and error types for hmacgate.
//!
//! This crate provides the pieces shared by the hmacgate server binary and its
//! tests: environment-driven gateway configuration, the client registry file
//! format, and the common error type.

mod clients;
mod config;
mod error;

pub use clients::{ClientRecord, DEFAULT_ROLE, load_clients, parse_clients};
pub use config::GatewayConfig;
pub use error::{GateError, GateResult};
