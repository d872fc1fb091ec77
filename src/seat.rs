//! Channel pair joining a connection's transport to a game session.
//!
//! The connection handler owns the socket and keeps the [`SeatLink`] half.
//! The session side ([`Seat`]) is parked in the registry until the game
//! starts and is then owned by the session's turn loop. Dropping the
//! [`Seat`] closes the link's outbound queue, which tells the handler to
//! close its transport.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Session-facing end of a seated connection.
#[derive(Debug)]
pub struct Seat {
    inbound: mpsc::Receiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

/// Connection-facing end of a seated connection.
#[derive(Debug)]
pub struct SeatLink {
    inbound: mpsc::Sender<String>,
    outbound: mpsc::UnboundedReceiver<String>,
}

/// Outcome of forwarding a client line towards the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forward {
    /// Queued for the session.
    Queued,
    /// Queue full; line dropped.
    Dropped,
    /// Session no longer listening.
    Closed,
}

/// Creates a linked seat pair; `backlog` bounds queued client lines.
pub fn channel(backlog: usize) -> (Seat, SeatLink) {
    let (in_tx, in_rx) = mpsc::channel(backlog.max(1));
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    (
        Seat {
            inbound: in_rx,
            outbound: out_tx,
        },
        SeatLink {
            inbound: in_tx,
            outbound: out_rx,
        },
    )
}

impl Seat {
    /// Sends a message to the client. Returns `false` if the connection is gone.
    pub fn send(&self, message: impl Into<String>) -> bool {
        self.outbound.send(message.into()).is_ok()
    }

    /// Waits for the next line from the client; `None` once it disconnected.
    pub async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    /// Resolves once the connection handler has let go of its link.
    pub async fn closed(&self) {
        self.outbound.closed().await
    }

    /// True if the connection handler has let go of its link.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

impl SeatLink {
    /// Queues a client line for the session without waiting.
    pub fn forward(&self, line: String) -> Forward {
        match self.inbound.try_send(line) {
            Ok(()) => Forward::Queued,
            Err(TrySendError::Full(line)) => {
                debug!(%line, "Seat backlog full, dropping line");
                Forward::Dropped
            }
            Err(TrySendError::Closed(_)) => Forward::Closed,
        }
    }

    /// Next message for the client; `None` once the seat was released.
    pub async fn next_message(&mut self) -> Option<String> {
        self.outbound.recv().await
    }
}
