//! Error types for the lobby server.

use crate::registry::GameId;
use derive_more::{Display, Error};
use tokio_util::codec::LinesCodecError;
use tracing::instrument;

/// Failure of a registry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RegistryError {
    /// No game with this id is registered.
    #[display("Game {} not found", _0)]
    NotFound(#[error(not(source))] GameId),

    /// The game already has two seated players.
    #[display("Game {} is full", _0)]
    GameFull(#[error(not(source))] GameId),

    /// The registry is shutting down and accepts no new games or seats.
    #[display("Server is shutting down")]
    Closed,
}

/// Matchmaking input that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CommandError {
    /// Blank line.
    #[display("Empty command")]
    Empty,

    /// Unrecognised command word.
    #[display("Unknown command '{}'", _0)]
    Unknown(#[error(not(source))] String),

    /// `join` without a game id.
    #[display("Missing game id")]
    MissingGameId,

    /// `join` with an id that is not a non-negative integer.
    #[display("Invalid game id '{}'", _0)]
    InvalidGameId(#[error(not(source))] String),

    /// The line was not valid UTF-8.
    #[display("Input is not valid text")]
    NotText,
}

/// A move that cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Input is not an integer.
    #[display("'{}' is not a move number", _0)]
    NotANumber(#[error(not(source))] String),

    /// Integer outside 1-9.
    #[display("Move {} is out of range (1-9)", _0)]
    OutOfRange(#[error(not(source))] i64),

    /// Target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    Occupied(#[error(not(source))] u32),

    /// The game has already reached a terminal status.
    #[display("Game is already over")]
    GameOver,
}

/// Transport or I/O failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Server error: {} at {}:{}", message, file, line)]
pub struct ServerError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ServerError {
    /// Creates a new server error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<LinesCodecError> for ServerError {
    #[track_caller]
    fn from(err: LinesCodecError) -> Self {
        Self::new(format!("Line codec error: {}", err))
    }
}
