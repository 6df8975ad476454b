//! `secret-code-svc` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Derive the codec key; failure aborts startup.
//! 4. Build the Axum router and start the HTTP server.

use anyhow::{Context, Result};
use tracing::{info, warn};

use secret_code::config::Config;
use secret_code::server::{self, state::AppState};
use secret_code::{telemetry, SecretCodeCodec};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "secret-code-svc starting"
    );
    if cfg.uses_default_secret_key() {
        warn!("SECRET_KEY is not set; using the built-in default passphrase, which is NOT safe for production");
    }

    // -----------------------------------------------------------------------
    // 3. Codec key
    // -----------------------------------------------------------------------
    let codec = SecretCodeCodec::from_passphrase(&cfg.secret_key);
    codec
        .init()
        .await
        .context("failed to derive secret-code key")?;
    info!("secret-code key derived");

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(codec, cfg.payload_kind_header.clone());
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
