//! Core domain types for tic-tac-toe.

use std::fmt;

/// Mark placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Mark {
    /// Mark X (moves first).
    X,
    /// Mark O (moves second).
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a mark.
    Occupied(Mark),
}

/// Row/column coordinate on the 3x3 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Row, 0-2 from the top.
    pub row: usize,
    /// Column, 0-2 from the left.
    pub col: usize,
}

impl Position {
    /// Creates a position without bounds checking.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Converts a client-facing move number (1-9, row-major) to a position.
    pub fn from_move_number(number: u32) -> Option<Self> {
        if !(1..=9).contains(&number) {
            return None;
        }
        let index = (number - 1) as usize;
        Some(Self::new(index / Board::SIZE, index % Board::SIZE))
    }

    /// Returns the client-facing move number (1-9) for this position.
    pub fn move_number(self) -> u32 {
        (self.row * Board::SIZE + self.col + 1) as u32
    }

    /// Checks the position lies inside the board.
    pub fn in_bounds(self) -> bool {
        self.row < Board::SIZE && self.col < Board::SIZE
    }
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// No winner yet and at least one empty cell.
    Ongoing,
    /// Three in a row for the given mark.
    Win(Mark),
    /// Board full with no three in a row.
    Draw,
}

/// 3x3 tic-tac-toe board, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Cell; 3]; 3],
}

impl Board {
    /// Side length of the board.
    pub const SIZE: usize = 3;

    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.cells.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    /// Overwrites the cell at `pos`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            *slot = cell;
        }
    }

    /// Iterates over every cell with its position, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (Position::new(row, col), *cell))
        })
    }

    /// Counts the cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells()
            .filter(|(_, cell)| *cell == Cell::Occupied(mark))
            .count()
    }

    /// Counts the occupied cells.
    pub fn filled(&self) -> usize {
        self.cells().filter(|(_, cell)| *cell != Cell::Empty).count()
    }
}

/// Renders three rows of `|`-separated symbols with a rule between rows.
/// Empty cells show their move number as a hint.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.iter().enumerate() {
            let symbols: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(col, cell)| match cell {
                    Cell::Empty => Position::new(row, col).move_number().to_string(),
                    Cell::Occupied(mark) => mark.to_string(),
                })
                .collect();
            write!(f, "{}", symbols.join(" | "))?;
            if row + 1 < Self::SIZE {
                write!(f, "\n---------\n")?;
            }
        }
        Ok(())
    }
}
