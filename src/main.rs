//! Sync-gateway failover monitor.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                       FAILOVER MONITOR                       │
//!   │                                                              │
//!   │   ┌────────┐  every interval  ┌────────────┐   HEAD /_ping   │
//!   │   │ timer  │ ───────────────▶ │ controller │ ──────────────▶ │──▶ primary
//!   │   └────────┘                  └─────┬──────┘   (on failure)  │──▶ secondary
//!   │                                     │ atomic swap            │
//!   │                                     ▼                        │
//!   │                              ┌──────────────┐                │
//!   │   application / status API ◀ │ FailoverState│                │
//!   │                              └──────────────┘                │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use clap::Parser;

use sync_failover::config::{load_config, validate_config, ConfigError, FailoverConfig};
use sync_failover::lifecycle::{self, wait_for_signal};
use sync_failover::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "sync-failover")]
#[command(about = "Monitors redundant sync-gateway endpoints and fails over between them", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "SYNC_FAILOVER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => FailoverConfig::default(),
    };
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sync-failover starting");
    match &args.config {
        Some(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        None => tracing::warn!("No configuration file given, using built-in endpoints"),
    }
    tracing::info!(
        interval_secs = config.monitor.interval_secs,
        timeout_secs = config.monitor.timeout_secs,
        failure_threshold = config.monitor.failure_threshold,
        default_endpoint = %config.monitor.default_endpoint,
        "Monitor settings"
    );

    let monitor = lifecycle::start(config).await?;
    tracing::info!(
        connection_url = %monitor.current_target(),
        "Application will initially connect to the default endpoint. Press Ctrl+C to exit."
    );

    match wait_for_signal().await {
        Ok(signal) => tracing::info!(?signal, "Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signals"),
    }

    monitor.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
