//! Seat positions within a game and their fixed mark assignment.

use crate::games::tictactoe::Mark;
use strum::EnumIter;

/// One of the two seats in a game.
///
/// The first seat always plays [`Mark::X`] and moves first; the second seat
/// plays [`Mark::O`]. Win attribution goes through [`Slot::for_mark`], never
/// through positional guesswork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Slot {
    /// Seat 0, taken by whoever seats first.
    First,
    /// Seat 1, taken by whoever seats second.
    Second,
}

impl Slot {
    /// Zero-based seat index.
    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }

    /// Seat for a zero-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Slot::First),
            1 => Some(Slot::Second),
            _ => None,
        }
    }

    /// One-based player number shown to clients.
    pub fn player_number(self) -> usize {
        self.index() + 1
    }

    /// The mark this seat places.
    pub fn mark(self) -> Mark {
        match self {
            Slot::First => Mark::X,
            Slot::Second => Mark::O,
        }
    }

    /// The seat that places `mark`.
    pub fn for_mark(mark: Mark) -> Self {
        match mark {
            Mark::X => Slot::First,
            Mark::O => Slot::Second,
        }
    }

    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }
}
