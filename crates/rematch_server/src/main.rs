//! Rematch server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use rematch_server::{ServerConfig, serve};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rematch_server=debug")),
        )
        .init();

    let config = ServerConfig::load(cli.config.as_deref())?.with_overrides(cli.host, cli.port);
    info!(addr = %config.bind_address(), "Starting rematch server");

    serve(config, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, shutting down"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
    }
}
