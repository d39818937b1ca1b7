//! hmacgate server - HMAC-authenticated HTTP API with replay protection.
//!
//! Every request outside the health endpoints must carry `x-client-id`,
//! `x-date`, `x-nonce` and `x-signature` headers signed with the client's
//! shared secret.
//!
//! # Usage
//!
//! ```text
//! HMAC_CLIENTS_FILE=clients.json hmacgate-server
//! hmacgate-server --health-check
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//! | `HMAC_CLOCK_SKEW_SECONDS` | `300` | Allowed `x-date` skew, inclusive |
//! | `HMAC_REPLAY_WINDOW_MINUTES` | `10` | How long accepted nonces are remembered |
//! | `HMAC_RESOLVER_TIMEOUT_MS` | `2000` | Bound on a credential lookup |
//! | `HMAC_REPLAY_SWEEP_SECONDS` | `60` | Replay cache sweep interval, `0` disables |
//! | `HMAC_CLIENTS_FILE` | *(unset)* | JSON array of `{clientId, secret, role}` |
//! | `HMAC_CLIENT_ID` / `HMAC_CLIENT_SECRET` / `HMAC_CLIENT_ROLE` | *(unset)* | One client from the environment |
//! | `HMAC_REQUIRED_ROLE` | *(unset)* | Role every caller must hold |

mod gateway;
mod handler;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use hmacgate_auth::{Credential, HmacVerifier, ReplayGuard, StaticCredentialResolver, VerifierConfig};
use hmacgate_core::{ClientRecord, GatewayConfig, load_clients};
use hmacgate_http::{HmacHttpConfig, HmacHttpService};

use crate::gateway::GatewayService;
use crate::handler::ApiHandler;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Collect client credentials from the registry file and the environment.
///
/// The environment client is added last and wins on a duplicate client id.
fn build_credentials(config: &GatewayConfig) -> Result<Vec<Credential>> {
    let mut records: Vec<ClientRecord> = Vec::new();

    if let Some(ref path) = config.clients_file {
        let loaded = load_clients(path)?;
        info!(path = %path.display(), clients = loaded.len(), "loaded client registry");
        records.extend(loaded);
    }
    if let Some(ref client) = config.env_client {
        info!(client_id = %client.client_id, role = %client.role, "configured client from environment");
        records.push(client.clone());
    }

    Ok(records
        .into_iter()
        .map(|r| Credential::new(r.client_id, r.secret, r.role))
        .collect())
}

/// Periodically drop expired nonces so the replay cache stays bounded.
fn spawn_replay_sweep(replay: Arc<ReplayGuard>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = replay.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = replay.len(), "swept replay cache");
            }
        }
    });
}

/// Probe the local health endpoint, for container health checks.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService<ApiHandler>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env();

    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    let verifier_config = VerifierConfig::from_env();
    let credentials = build_credentials(&config)?;
    if credentials.is_empty() {
        warn!("no clients configured; every request will be rejected");
    }

    let resolver = StaticCredentialResolver::new(credentials);
    let verifier = Arc::new(HmacVerifier::new(Arc::new(resolver), verifier_config.clone()));

    if config.replay_sweep_seconds > 0 {
        spawn_replay_sweep(
            Arc::clone(verifier.replay_guard()),
            Duration::from_secs(config.replay_sweep_seconds),
        );
    }

    let api = HmacHttpService::new(
        Arc::new(ApiHandler),
        verifier,
        HmacHttpConfig {
            required_role: config.required_role.clone(),
        },
    );
    let gateway = GatewayService::new(api);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        clock_skew_seconds = verifier_config.clock_skew_tolerance.num_seconds(),
        replay_window_minutes = verifier_config.replay_window.num_minutes(),
        required_role = ?config.required_role,
        version = VERSION,
        "starting hmacgate server",
    );

    serve(listener, gateway).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_credentials_from_env_client() {
        let config = GatewayConfig {
            env_client: Some(ClientRecord {
                client_id: "manager-1".to_owned(),
                secret: "pm-secret".to_owned(),
                role: "ProductManager".to_owned(),
            }),
            ..GatewayConfig::default()
        };

        let credentials = build_credentials(&config).unwrap();
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials[0].client_id, "manager-1");
        assert_eq!(credentials[0].secret.expose(), b"pm-secret");
    }

    #[test]
    fn test_should_fail_on_missing_clients_file() {
        let config = GatewayConfig {
            clients_file: Some("/nonexistent/clients.json".into()),
            ..GatewayConfig::default()
        };
        assert!(build_credentials(&config).is_err());
    }

    #[test]
    fn test_should_build_no_credentials_by_default() {
        let credentials = build_credentials(&GatewayConfig::default()).unwrap();
        assert!(credentials.is_empty());
    }
}
