//! Game session turn loop.
//!
//! A [`GameSession`] exists once both seats are filled. It is the only
//! writer of its board; it reads from exactly one seat at a time and runs
//! until the game reaches a terminal status, then removes itself from the
//! registry and drops both seats.

use crate::error::MoveError;
use crate::games::tictactoe::{Board, Evaluation, apply_move, check_move, evaluate};
use crate::protocol::messages;
use crate::registry::{GameId, GameRegistry};
use crate::seat::Seat;
use crate::slot::Slot;
use derive_more::Display;
use std::fmt;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionStatus {
    /// Created, fewer than two players seated.
    AwaitingPlayers,
    /// Both seats filled, turn loop running.
    InProgress,
    /// Seat 0 completed a line.
    Player1Wins,
    /// Seat 1 completed a line.
    Player2Wins,
    /// Board filled without a line.
    Draw,
    /// Cut short by a disconnect or server shutdown.
    Aborted,
}

impl SessionStatus {
    /// True for statuses no further move can leave.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Player1Wins
                | SessionStatus::Player2Wins
                | SessionStatus::Draw
                | SessionStatus::Aborted
        )
    }

    /// Terminal status for a win by `slot`.
    pub fn won_by(slot: Slot) -> Self {
        match slot {
            Slot::First => SessionStatus::Player1Wins,
            Slot::Second => SessionStatus::Player2Wins,
        }
    }
}

/// Why a game was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// A seated client went away.
    Disconnected(Slot),
    /// The server is shutting down.
    Shutdown,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Disconnected(slot) => {
                write!(f, "player {} disconnected", slot.player_number())
            }
            AbortReason::Shutdown => write!(f, "server shutting down"),
        }
    }
}

/// What the turn loop woke up for.
#[derive(Debug)]
enum Input {
    Line(String),
    Abort(AbortReason),
}

/// One running match between two seated players.
#[derive(Debug)]
pub struct GameSession {
    id: GameId,
    board: Board,
    seats: [Seat; 2],
    current: Slot,
    status: SessionStatus,
    shutdown: CancellationToken,
    registry: GameRegistry,
}

impl GameSession {
    pub(crate) fn new(
        id: GameId,
        seats: [Seat; 2],
        shutdown: CancellationToken,
        registry: GameRegistry,
    ) -> Self {
        Self {
            id,
            board: Board::new(),
            seats,
            current: Slot::First,
            status: SessionStatus::InProgress,
            shutdown,
            registry,
        }
    }

    /// Game id.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seat whose move is awaited.
    pub fn current_turn(&self) -> Slot {
        self.current
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    fn seat(&self, slot: Slot) -> &Seat {
        &self.seats[slot.index()]
    }

    fn broadcast(&self, message: &str) {
        for slot in Slot::iter() {
            if !self.seat(slot).send(message) {
                debug!(game_id = %self.id, ?slot, "Seat gone, message not delivered");
            }
        }
    }

    /// Runs the turn loop to a terminal status and cleans up.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub async fn run(mut self) -> SessionStatus {
        info!("Game started");
        self.broadcast(&messages::game_started(&self.board));

        while self.status == SessionStatus::InProgress {
            let prompt = messages::your_move(self.current);
            self.seat(self.current).send(prompt);

            match self.next_input().await {
                Input::Line(line) => {
                    if let Err(err) = self.submit_move(&line) {
                        debug!(slot = ?self.current, %line, error = %err, "Rejected move");
                        self.seat(self.current).send(messages::invalid_move(&err));
                    }
                }
                Input::Abort(reason) => self.abort(reason),
            }
        }

        self.registry.finish(self.id, self.status);
        info!(status = %self.status, "Game over, releasing seats");
        self.status
    }

    /// Waits for a line from the seat to move, a disconnect of either seat,
    /// or an abort signal.
    async fn next_input(&mut self) -> Input {
        let current = self.current;
        let [first, second] = &mut self.seats;
        let (active, idle) = match current {
            Slot::First => (first, &*second),
            Slot::Second => (second, &*first),
        };

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Input::Abort(AbortReason::Shutdown),
            line = active.recv() => match line {
                Some(line) => Input::Line(line),
                None => Input::Abort(AbortReason::Disconnected(current)),
            },
            _ = idle.closed() => Input::Abort(AbortReason::Disconnected(current.other())),
        }
    }

    /// Plays one move for the seat whose turn it is.
    ///
    /// On error nothing changes: same board, same seat to move. On success
    /// the board is sent to both seats and the game either passes the turn
    /// or ends with the result sent to each seat.
    #[instrument(skip(self), fields(game_id = %self.id, slot = ?self.current))]
    pub fn submit_move(&mut self, input: &str) -> Result<Evaluation, MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let pos = check_move(&self.board, input)?;
        apply_move(&mut self.board, pos, self.current.mark());
        debug!(cell = pos.move_number(), "Move applied");
        self.broadcast(&messages::board(&self.board));

        let evaluation = evaluate(&self.board);
        match evaluation {
            Evaluation::Win(mark) => {
                let winner = Slot::for_mark(mark);
                self.conclude(SessionStatus::won_by(winner));
                self.seat(winner).send(messages::you_won());
                self.seat(winner.other()).send(messages::you_lost());
            }
            Evaluation::Draw => {
                self.conclude(SessionStatus::Draw);
                self.broadcast(&messages::draw());
            }
            Evaluation::Ongoing => self.current = self.current.other(),
        }
        Ok(evaluation)
    }

    fn abort(&mut self, reason: AbortReason) {
        warn!(game_id = %self.id, %reason, "Aborting game");
        self.conclude(SessionStatus::Aborted);
        let notice = messages::aborted(reason);
        for slot in Slot::iter() {
            let seat = self.seat(slot);
            if !seat.is_closed() {
                seat.send(notice.clone());
            }
        }
    }

    fn conclude(&mut self, status: SessionStatus) {
        if self.status.is_terminal() {
            warn!(
                game_id = %self.id,
                current = %self.status,
                ignored = %status,
                "Game already over"
            );
            return;
        }
        self.status = status;
        info!(game_id = %self.id, %status, "Game reached terminal status");
    }
}
