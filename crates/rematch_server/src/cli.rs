//! Command-line interface for rematch_server.

use clap::Parser;
use std::path::PathBuf;

/// Rematch - two-player tic-tac-toe room server over WebSockets
#[derive(Parser, Debug)]
#[command(name = "rematch_server")]
#[command(about = "Matchmaking and game-state server for two-player tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to (overrides config and environment)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides config, VITE_BACK_PORT and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}
