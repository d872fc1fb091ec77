//! Command-line interface for strictly_lobby.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Lobby - tic-tac-toe over a plain line protocol
#[derive(Parser, Debug)]
#[command(name = "strictly_lobby")]
#[command(about = "Multiplayer tic-tac-toe server with text matchmaking", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the effective configuration as TOML
    ShowConfig {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
