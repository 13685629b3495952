//! Rentwise Server - rent prediction API
//!
//! Loads the trained model once and serves it over HTTP.
//!
//! # Usage
//! ```sh
//! MODEL_PATH=models MODEL_NAME=rf_v1 cargo run --bin rent-server
//! ```
//!
//! # Environment Variables
//! - `SERVER_BIND_ADDRESS` / `SERVER_PORT` - listen address (default: 0.0.0.0:8000)
//! - `PREDICT_TIMEOUT_MS` - per-request model budget (default: 2000)

use anyhow::{Context, Result};
use clap::Parser;
use rentwise::config::Config;
use rentwise::infrastructure::observability::{Metrics, init_tracing};
use rentwise::domain::ports::ModelStore;
use rentwise::infrastructure::persistence::model_registry::ModelRegistry;
use rentwise::interfaces::api::{AppState, create_router};
use std::path::PathBuf;
use tracing::{Level, info, warn};

#[derive(Parser)]
#[command(author, version, about = "Apartment rent prediction API", long_about = None)]
struct Cli {
    /// Model artifact to serve (defaults to MODEL_PATH/MODEL_NAME)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(Level::INFO);
    info!("Rentwise Server {} starting...", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let model_path = cli.model.unwrap_or_else(|| config.model.artifact_path());
    let artifact = ModelRegistry::new(&model_path)
        .load()
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;

    let metrics = Metrics::new()?;
    let state = AppState::new(artifact, metrics, config.server.predict_timeout())?;
    let app = create_router(state);

    let addr = config.server.socket_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received. Draining connections..."),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
