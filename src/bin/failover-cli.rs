use std::process::ExitCode;
use std::time::Duration;
use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

use sync_failover::health::{HttpProber, Prober};
use sync_failover::observability::logging::env_filter;

#[derive(Parser)]
#[command(name = "failover-cli")]
#[command(about = "Management CLI for the sync-gateway failover monitor", long_about = None)]
struct Cli {
    /// Base URL of the monitor's status API.
    #[arg(short, long, default_value = "http://127.0.0.1:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active endpoint and connection URL
    Status,
    /// List configured endpoints
    Endpoints,
    /// Probe a health-check URL once
    Probe {
        url: Url,

        /// Probe timeout in seconds.
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let res = reqwest::get(format!("{}/status", cli.url)).await?;
            return print_response(res).await;
        }
        Commands::Endpoints => {
            let res = reqwest::get(format!("{}/endpoints", cli.url)).await?;
            return print_response(res).await;
        }
        Commands::Probe { url, timeout_secs } => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("info"))
                .init();

            let prober = HttpProber::new(Duration::from_secs(timeout_secs))?;
            let verdict = prober.probe(&url).await;
            println!("{}: {}", url, verdict);

            if !verdict.is_healthy() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print a status API reply; a non-2xx status maps to a failing exit code.
async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: status API returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
