//! Shared helpers for driving the lobby from the client side.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use std::time::Duration;
use strictly_lobby::{ConnectionHandler, GameRegistry, LobbyContext, ServerConfig};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio_util::codec::{Framed, LinesCodec};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Upper bound on any single wait in a test.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Line-oriented test client.
pub struct Client<S> {
    lines: Framed<S, LinesCodec>,
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            lines: Framed::new(stream, LinesCodec::new()),
        }
    }

    pub async fn send(&mut self, line: &str) {
        self.lines.send(line).await.expect("Failed to send line");
    }

    /// Writes bytes as-is, bypassing the line encoder.
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        let stream = self.lines.get_mut();
        stream.write_all(bytes).await.expect("Failed to write bytes");
        stream.flush().await.expect("Failed to flush");
    }

    /// Next line from the server, `None` once the server closed.
    pub async fn next_line(&mut self) -> Option<String> {
        tokio::time::timeout(TIMEOUT, self.lines.next())
            .await
            .expect("Timed out waiting for server")
            .map(|line| line.expect("Failed to decode line"))
    }

    /// Reads lines up to and including the first containing `needle`.
    pub async fn read_until(&mut self, needle: &str) -> Vec<String> {
        let mut seen = Vec::new();
        loop {
            let line = match self.next_line().await {
                Some(line) => line,
                None => panic!("Connection closed before {:?}; saw {:?}", needle, seen),
            };
            let done = line.contains(needle);
            seen.push(line);
            if done {
                return seen;
            }
        }
    }

    /// Reads until the server closes the connection.
    pub async fn read_to_close(&mut self) -> Vec<String> {
        let mut seen = Vec::new();
        while let Some(line) = self.next_line().await {
            seen.push(line);
        }
        seen
    }
}

/// Context with a fresh registry and default settings.
pub fn context() -> LobbyContext {
    context_with(ServerConfig::default())
}

/// Context with a fresh registry and the given settings.
pub fn context_with(config: ServerConfig) -> LobbyContext {
    LobbyContext::new(
        GameRegistry::new(),
        CancellationToken::new(),
        TaskTracker::new(),
        config,
    )
}

/// Spawns a handler on an in-memory pipe and returns the client end.
pub fn connect(context: &LobbyContext, peer: &str) -> Client<DuplexStream> {
    let (client, server) = tokio::io::duplex(4096);
    let handler = ConnectionHandler::new(server, peer, context.clone());
    tokio::spawn(handler.run());
    Client::new(client)
}
