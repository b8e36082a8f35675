//! SignStream - Real-Time Sign Language Recognition Server
//!
//! Streams hand/body landmark frames from clients over a WebSocket, decides
//! frame by frame when enough evidence has accumulated, arbitrates among the
//! static, dynamic, and word-sequence classifiers, and emits one
//! authoritative result per detected sign.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (expects a model server on localhost:6000)
//! cargo run --release
//!
//! # Point at a specific config file
//! cargo run --release -- --config deploy/signstream.toml
//! ```
//!
//! # Environment Variables
//!
//! - `SIGNSTREAM_CONFIG`: Path to the TOML config file
//! - `SIGNSTREAM_SERVER_ADDR`: Override the bind address
//! - `SIGNSTREAM_CORS_ORIGINS`: Comma-separated dev origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use signstream::api::{create_app, ApiState};
use signstream::classify::ModelRegistry;
use signstream::config::{self, AppConfig};
use signstream::extract::build_extractor;
use signstream::state::{AppState, SystemStatus};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "signstream")]
#[command(about = "SignStream real-time sign language recognition server")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (overrides SIGNSTREAM_CONFIG)
    #[arg(short, long)]
    config: Option<String>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    // Load configuration: --config > SIGNSTREAM_CONFIG > local file > defaults
    let app_config = match &args.config {
        Some(path) => AppConfig::load_from_file(std::path::Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => AppConfig::load(),
    };
    config::init(app_config);
    let cfg = config::get();

    // Bind address: --addr > SIGNSTREAM_SERVER_ADDR > config
    let server_addr = args
        .addr
        .or_else(|| std::env::var("SIGNSTREAM_SERVER_ADDR").ok())
        .unwrap_or_else(|| cfg.server.addr.clone());

    info!("🖐  SignStream starting");
    info!(
        backend = %cfg.inference.base_url,
        wire_format = ?cfg.inference.wire_format,
        "Inference backend configured"
    );

    // Shared, read-only classifier handles: built once, injected into every
    // session's arbiter.
    let registry = Arc::new(
        ModelRegistry::http(&cfg.inference).context("Failed to build classifier registry")?,
    );
    let extractor =
        build_extractor(&cfg.inference).context("Failed to build landmark extractor")?;

    let app_state = Arc::new(RwLock::new(AppState::default()));
    {
        let mut state = app_state.write().await;
        state.status = SystemStatus::Serving;
    }

    let api_state = ApiState::new(app_state, registry, extractor);
    let app = create_app(api_state);

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;

    info!("✓ Server listening on {}", server_addr);
    info!("   WebSocket: ws://{}/handsup/ws/translate", server_addr);
    info!("   Status:    http://{}/api/v1/status", server_addr);

    // Graceful shutdown on ctrl-c
    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}
