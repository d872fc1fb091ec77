//! TCP front end: accept loop and graceful shutdown.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handler::{ConnectionHandler, LobbyContext};
use crate::registry::GameRegistry;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, instrument, warn};

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Listening tic-tac-toe lobby server.
#[derive(Debug)]
pub struct GameServer {
    listener: TcpListener,
    registry: GameRegistry,
    tracker: TaskTracker,
    config: ServerConfig,
}

impl GameServer {
    /// Binds the configured address.
    #[instrument(skip(config), fields(address = %config.bind_address()))]
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_address())
            .await
            .map_err(|e| {
                ServerError::new(format!("Failed to bind {}: {}", config.bind_address(), e))
            })?;
        info!("Listening");

        Ok(Self {
            listener,
            registry: GameRegistry::new(),
            tracker: TaskTracker::new(),
            config,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// The registry shared by all connections.
    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Accepts connections until `shutdown` is cancelled, then aborts all
    /// games and waits for connections to drain.
    #[instrument(skip(self, shutdown))]
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let context = LobbyContext::new(
            self.registry.clone(),
            shutdown.clone(),
            self.tracker.clone(),
            self.config.clone(),
        );

        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(%peer, error = %err, "Failed to set TCP_NODELAY");
                    }
                    let handler = ConnectionHandler::new(stream, peer.to_string(), context.clone());
                    self.tracker.spawn(async move {
                        if let Err(err) = handler.run().await {
                            warn!(%peer, error = %err, "Connection ended with error");
                        }
                    });
                }
                Err(err) => {
                    error!(error = %err, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }

        info!("Shutdown requested, no longer accepting connections");
        drop(self.listener);

        let aborted = self.registry.abort_all();
        info!(aborted, "Signalled active games");

        self.tracker.close();
        let grace = self.config.shutdown_grace();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                remaining = self.tracker.len(),
                "Tasks still running after shutdown grace period"
            );
        } else {
            info!("All connections drained");
        }
        Ok(())
    }
}
