//! Strictly Lobby library - multiplayer tic-tac-toe over a line protocol
//!
//! Clients connect over TCP, pair up with `create` / `join <id>`, and play
//! a server-authoritative game of tic-tac-toe.
//!
//! # Architecture
//!
//! - **Rules**: pure board functions (validate, apply, evaluate)
//! - **Registry**: shared map of games behind one mutex
//! - **Session**: per-game turn loop, sole writer of its board
//! - **Handler**: per-connection matchmaking and seat relay
//! - **Server**: accept loop and graceful shutdown
//!
//! # Example
//!
//! ```no_run
//! use strictly_lobby::{GameServer, ServerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = GameServer::bind(ServerConfig::default()).await?;
//! let shutdown = CancellationToken::new();
//! server.run(shutdown).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod codec;
mod config;
mod error;
mod games;
mod handler;
mod protocol;
mod registry;
mod seat;
mod server;
mod session;
mod slot;

// Crate-level exports - Wire codec
pub use codec::{ClientCodec, Inbound};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Errors
pub use error::{CommandError, MoveError, RegistryError, ServerError};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, Cell, Evaluation, Mark, Position, apply_move, check_move, evaluate, is_full,
    parse_move, validate_move, winner,
};

// Crate-level exports - Registry and sessions
pub use registry::{GameId, GameInfo, GameRegistry, Seating};
pub use seat::{Forward, Seat, SeatLink, channel as seat_channel};
pub use session::{AbortReason, GameSession, SessionStatus};
pub use slot::Slot;

// Crate-level exports - Protocol and networking
pub use handler::{ConnectionHandler, LobbyContext};
pub use protocol::{Command, messages};
pub use server::GameServer;
