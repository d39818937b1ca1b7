//! Error types for the hmacgate core.

/// Core error type for hmacgate infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A client registry file could not be read.
    #[error("failed to read client registry {path}: {source}")]
    ReadClients {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A client registry file is not a valid JSON client list.
    #[error("invalid client registry {path}: {source}")]
    ParseClients {
        /// Path that was parsed.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience result type for hmacgate operations.
pub type GateResult<T> = Result<T, GateError>;
