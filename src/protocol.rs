//! Text protocol: matchmaking commands and server messages.

use crate::error::CommandError;
use crate::registry::GameId;
use crate::session::AbortReason;
use crate::slot::Slot;
use std::fmt::Display;
use tracing::instrument;

/// A matchmaking command sent by an unseated client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create a new game and take its first seat.
    Create,
    /// Join an existing game.
    Join(GameId),
    /// List games waiting for an opponent.
    List,
    /// Repeat the instructions.
    Help,
    /// Disconnect.
    Quit,
}

impl Command {
    /// Parses one input line as `<command> [argument]`.
    ///
    /// The command word is case-insensitive. Tokens after the expected
    /// argument are ignored.
    #[instrument]
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next().ok_or(CommandError::Empty)?.to_lowercase();

        match command.as_str() {
            "create" => Ok(Command::Create),
            "join" => {
                let raw = tokens.next().ok_or(CommandError::MissingGameId)?;
                raw.parse::<u64>()
                    .map(|id| Command::Join(GameId::new(id)))
                    .map_err(|_| CommandError::InvalidGameId(raw.to_string()))
            }
            "list" => Ok(Command::List),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(command)),
        }
    }
}

/// Server message texts.
pub mod messages {
    use super::*;
    use crate::games::tictactoe::Board;

    const INSTRUCTIONS: &str = "Enter 'join <game_id>' to join a game or 'create' to create a \
                                new game ('list' shows open games):";

    /// Greeting sent on connect.
    pub fn welcome() -> String {
        format!("Welcome to Tic-Tac-Toe! {}", INSTRUCTIONS)
    }

    /// Seating failed; the client may retry.
    pub fn join_failed(reason: impl Display) -> String {
        format!("Failed to join game: {}. {}", reason, INSTRUCTIONS)
    }

    /// Unparseable matchmaking input.
    pub fn invalid_input(reason: impl Display) -> String {
        format!("Invalid input ({}). {}", reason, INSTRUCTIONS)
    }

    /// Games currently waiting for an opponent.
    pub fn open_games(ids: &[GameId]) -> String {
        if ids.is_empty() {
            return "No open games. Enter 'create' to start one.".to_string();
        }
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        format!("Open games: {}", ids.join(", "))
    }

    /// Sent to a player holding the first seat of a new game.
    pub fn waiting_for_opponent(id: GameId) -> String {
        format!(
            "Joined game {} as player 1 (X). Waiting for an opponent to 'join {}'...",
            id, id
        )
    }

    /// Sent to the player who took the second seat.
    pub fn joined(id: GameId, slot: Slot) -> String {
        format!(
            "Joined game {} as player {} ({}).",
            id,
            slot.player_number(),
            slot.mark()
        )
    }

    /// Start-of-game announcement with the numbered board.
    pub fn game_started(board: &Board) -> String {
        format!("Game has started!\n{}", board)
    }

    /// Turn prompt for a seat.
    pub fn your_move(slot: Slot) -> String {
        format!("Your move (player {}):", slot.player_number())
    }

    /// Rejected move; the same seat is prompted again.
    pub fn invalid_move(reason: impl Display) -> String {
        format!("Invalid move: {}. Try again.", reason)
    }

    /// Board after a move.
    pub fn board(board: &Board) -> String {
        board.to_string()
    }

    /// Sent to the winning seat.
    pub fn you_won() -> String {
        "You won!".to_string()
    }

    /// Sent to the losing seat.
    pub fn you_lost() -> String {
        "You lost!".to_string()
    }

    /// Sent to both seats on a draw.
    pub fn draw() -> String {
        "It's a draw!".to_string()
    }

    /// Sent to any still-connected seat when a game is cut short.
    pub fn aborted(reason: AbortReason) -> String {
        format!("Game aborted: {}.", reason)
    }

    /// Sent to seated clients whose input queue overflowed.
    pub fn input_dropped() -> String {
        "Too much input queued; line ignored.".to_string()
    }

    /// Sent when a line exceeds the configured length.
    pub fn line_too_long(max: usize) -> String {
        format!("Line too long (max {} characters); ignored.", max)
    }

    /// Sent to unseated clients on server shutdown.
    pub fn shutting_down() -> String {
        "Server is shutting down. Goodbye!".to_string()
    }

    /// Sent in reply to `quit`.
    pub fn goodbye() -> String {
        "Goodbye!".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_and_join() {
        assert_eq!(Command::parse("create"), Ok(Command::Create));
        assert_eq!(Command::parse("  CREATE  \r"), Ok(Command::Create));
        assert_eq!(Command::parse("join 7"), Ok(Command::Join(GameId::new(7))));
        assert_eq!(Command::parse("join 7 extra"), Ok(Command::Join(GameId::new(7))));
    }

    #[test]
    fn test_parse_rejects_bad_join() {
        assert_eq!(Command::parse("join"), Err(CommandError::MissingGameId));
        assert_eq!(
            Command::parse("join abc"),
            Err(CommandError::InvalidGameId("abc".into()))
        );
        assert_eq!(
            Command::parse("join -1"),
            Err(CommandError::InvalidGameId("-1".into()))
        );
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(Command::parse("list"), Ok(Command::List));
        assert_eq!(Command::parse("help"), Ok(Command::Help));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("dance now"),
            Err(CommandError::Unknown("dance".into()))
        );
    }

    #[test]
    fn test_open_games_message() {
        assert!(messages::open_games(&[]).starts_with("No open games"));
        assert_eq!(
            messages::open_games(&[GameId::new(2), GameId::new(5)]),
            "Open games: 2, 5"
        );
    }
}
