//! Process-wide registry of game sessions.
//!
//! Every operation is one critical section over a single mutex. Nothing in
//! here awaits or touches a socket while the lock is held.

use crate::error::RegistryError;
use crate::protocol::messages;
use crate::seat::Seat;
use crate::session::{AbortReason, GameSession, SessionStatus};
use crate::slot::Slot;
use derive_getters::Getters;
use derive_more::{Display, From};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Unique game identifier, assigned from a counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{}", _0)]
pub struct GameId(u64);

impl GameId {
    /// Wraps a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Snapshot of a registered game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_new::new)]
pub struct GameInfo {
    /// Game id.
    id: GameId,
    /// Lifecycle status at the time of the lookup.
    status: SessionStatus,
    /// Number of seated players (0-2).
    seated: usize,
}

/// Result of a successful [`GameRegistry::seat_player`].
#[derive(Debug)]
pub struct Seating {
    /// The seat assigned to the caller.
    pub slot: Slot,
    /// Present when this call filled the game. The caller must drive it
    /// with [`GameSession::run`].
    pub session: Option<GameSession>,
}

/// Who is seated in a registered game.
#[derive(Debug)]
enum Lineup {
    Empty,
    Waiting(Seat),
    Started,
}

impl Lineup {
    fn seated(&self) -> usize {
        match self {
            Lineup::Empty => 0,
            Lineup::Waiting(_) => 1,
            Lineup::Started => 2,
        }
    }
}

#[derive(Debug)]
struct SessionRecord {
    status: SessionStatus,
    lineup: Lineup,
    abort: CancellationToken,
}

#[derive(Debug, Default)]
struct RegistryInner {
    last_id: u64,
    closed: bool,
    games: HashMap<GameId, SessionRecord>,
}

/// Shared collection of active games.
///
/// Cheap to clone; all clones see the same games.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl GameRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating game registry");
        Self::default()
    }

    // Registry state stays consistent between statements, so a panic in
    // another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new game awaiting players and returns its id.
    #[instrument(skip(self))]
    pub fn create_game(&self) -> Result<GameId, RegistryError> {
        let mut inner = self.lock();
        if inner.closed {
            warn!("Refusing to create game, registry closed");
            return Err(RegistryError::Closed);
        }

        inner.last_id += 1;
        let id = GameId(inner.last_id);
        inner.games.insert(
            id,
            SessionRecord {
                status: SessionStatus::AwaitingPlayers,
                lineup: Lineup::Empty,
                abort: CancellationToken::new(),
            },
        );

        info!(game_id = %id, "Created game");
        Ok(id)
    }

    /// Looks up a game.
    #[instrument(skip(self))]
    pub fn find_game(&self, id: GameId) -> Result<GameInfo, RegistryError> {
        let inner = self.lock();
        inner
            .games
            .get(&id)
            .map(|record| GameInfo::new(id, record.status, record.lineup.seated()))
            .ok_or_else(|| {
                debug!(game_id = %id, "Game not found");
                RegistryError::NotFound(id)
            })
    }

    /// Seats a player in a game.
    ///
    /// Lookup and mutation share one critical section, so two concurrent
    /// callers can never both take the same seat. The call that fills the
    /// second seat moves the game to `InProgress` and receives the
    /// [`GameSession`] to run.
    #[instrument(skip(self, seat))]
    pub fn seat_player(&self, id: GameId, seat: Seat) -> Result<Seating, RegistryError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(RegistryError::Closed);
        }

        let registry = self.clone();
        let record = inner.games.get_mut(&id).ok_or_else(|| {
            debug!(game_id = %id, "Cannot seat player, game not found");
            RegistryError::NotFound(id)
        })?;

        match std::mem::replace(&mut record.lineup, Lineup::Started) {
            Lineup::Empty => {
                record.lineup = Lineup::Waiting(seat);
                info!(game_id = %id, slot = ?Slot::First, "Player seated");
                Ok(Seating {
                    slot: Slot::First,
                    session: None,
                })
            }
            Lineup::Waiting(first) => {
                record.status = SessionStatus::InProgress;
                info!(game_id = %id, slot = ?Slot::Second, "Player seated, game in progress");
                let session = GameSession::new(id, [first, seat], record.abort.clone(), registry);
                Ok(Seating {
                    slot: Slot::Second,
                    session: Some(session),
                })
            }
            Lineup::Started => {
                warn!(game_id = %id, "Cannot seat player, game full");
                Err(RegistryError::GameFull(id))
            }
        }
    }

    /// Removes a game. Returns `false` if it was not registered.
    #[instrument(skip(self))]
    pub fn remove_game(&self, id: GameId) -> bool {
        let removed = self.lock().games.remove(&id).is_some();
        debug!(game_id = %id, removed, "Remove game");
        removed
    }

    /// Records a session's terminal status and removes it, in one step.
    ///
    /// Returns whether this call removed the game; a second call for the
    /// same id is a no-op.
    #[instrument(skip(self))]
    pub fn finish(&self, id: GameId, status: SessionStatus) -> bool {
        let mut inner = self.lock();
        match inner.games.remove(&id) {
            Some(_) => {
                info!(game_id = %id, %status, "Game finished and removed");
                true
            }
            None => {
                debug!(game_id = %id, "Game already removed");
                false
            }
        }
    }

    /// Drops a game whose only seated player left before an opponent arrived.
    ///
    /// Games that already started are left to their turn loop.
    #[instrument(skip(self))]
    pub fn abandon(&self, id: GameId) -> bool {
        let mut inner = self.lock();
        let waiting = inner
            .games
            .get(&id)
            .is_some_and(|record| record.status == SessionStatus::AwaitingPlayers);
        if waiting {
            inner.games.remove(&id);
            info!(game_id = %id, "Abandoned game removed");
        }
        waiting
    }

    /// Shutdown entry point: closes the registry to new games and seats,
    /// signals every running turn loop to abort, and releases players still
    /// waiting for an opponent. Returns the number of games affected.
    #[instrument(skip(self))]
    pub fn abort_all(&self) -> usize {
        let mut inner = self.lock();
        inner.closed = true;

        let count = inner.games.len();
        inner.games.retain(|id, record| match &record.lineup {
            Lineup::Started => {
                record.abort.cancel();
                true
            }
            // Dropping the parked seat releases the waiting connection.
            Lineup::Waiting(seat) => {
                debug!(game_id = %id, "Releasing waiting player");
                seat.send(messages::aborted(AbortReason::Shutdown));
                false
            }
            Lineup::Empty => false,
        });

        info!(count, "Aborted all games");
        count
    }

    /// Ids of games with exactly one seated player, ascending.
    #[instrument(skip(self))]
    pub fn open_games(&self) -> Vec<GameId> {
        let inner = self.lock();
        let mut ids: Vec<GameId> = inner
            .games
            .iter()
            .filter(|(_, record)| matches!(record.lineup, Lineup::Waiting(_)))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Number of registered games.
    pub fn len(&self) -> usize {
        self.lock().games.len()
    }

    /// True when no games are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once [`GameRegistry::abort_all`] has run.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
