//! Strictly Lobby - server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_lobby::{GameServer, ServerConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => {
            initialize_tracing();
            run_server(config, host, port).await
        }
        Command::ShowConfig { config } => {
            let config = ServerConfig::load(config.as_deref())?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Run the game server until Ctrl+C
#[instrument(skip_all)]
async fn run_server(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let config = ServerConfig::load(config.as_deref())?.with_overrides(host, port);
    info!(address = %config.bind_address(), "Starting Strictly Lobby server");

    let server = GameServer::bind(config).await?;
    info!(address = %server.local_addr()?, "Server ready - connect with any line-based TCP client");

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C received, shutting down"),
            Err(err) => warn!(error = %err, "Failed to listen for Ctrl+C, shutting down"),
        }
        trigger.cancel();
    });

    server.run(shutdown).await?;
    info!("Server stopped");
    Ok(())
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_lobby=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
