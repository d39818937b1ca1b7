//! Configuration management for the hmacgate server.
//!
//! All configuration is driven by environment variables. Protocol tunables
//! (clock skew, replay window, resolver timeout) live with the verifier in
//! `hmacgate-auth`; this struct covers the process around it.

use std::env;
use std::path::PathBuf;

use crate::clients::{ClientRecord, DEFAULT_ROLE};

/// Server-level configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address for the gateway.
    pub gateway_listen: String,
    /// Log level.
    pub log_level: String,
    /// Seconds between replay-cache sweeps. Zero disables the sweep.
    pub replay_sweep_seconds: u64,
    /// JSON file listing client credentials.
    pub clients_file: Option<PathBuf>,
    /// A single client configured directly from the environment.
    #[serde(skip)]
    pub env_client: Option<ClientRecord>,
    /// Role every authenticated caller must hold, if any.
    pub required_role: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:4566".to_owned(),
            log_level: "info".to_owned(),
            replay_sweep_seconds: 60,
            clients_file: None,
            env_client: None,
            required_role: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = env::var("HMAC_REPLAY_SWEEP_SECONDS") {
            match v.trim().parse() {
                Ok(secs) => config.replay_sweep_seconds = secs,
                Err(_) => tracing::warn!(value = %v, "ignoring unparsable HMAC_REPLAY_SWEEP_SECONDS"),
            }
        }
        if let Some(v) = non_empty_var("HMAC_CLIENTS_FILE") {
            config.clients_file = Some(PathBuf::from(v));
        }
        if let (Some(client_id), Some(secret)) = (
            non_empty_var("HMAC_CLIENT_ID"),
            non_empty_var("HMAC_CLIENT_SECRET"),
        ) {
            config.env_client = Some(ClientRecord {
                client_id,
                secret,
                role: non_empty_var("HMAC_CLIENT_ROLE").unwrap_or_else(|| DEFAULT_ROLE.to_owned()),
            });
        }
        config.required_role = non_empty_var("HMAC_REQUIRED_ROLE");

        config
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
