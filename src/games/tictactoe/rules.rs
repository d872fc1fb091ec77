//! Move validation and outcome detection for tic-tac-toe.
//!
//! Pure functions over a [`Board`]; nothing here is shared or locked.

use super::types::{Board, Cell, Evaluation, Mark, Position};
use crate::error::MoveError;
use tracing::instrument;

/// Every three-in-a-row line: rows, columns, diagonals.
const LINES: [[(usize, usize); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Parses a client move token (`1`-`9`, row-major) into a board position.
///
/// Surrounding whitespace is ignored. Anything else is an error; occupancy
/// is not checked here.
#[instrument]
pub fn parse_move(input: &str) -> Result<Position, MoveError> {
    let token = input.trim();
    let number: i64 = token
        .parse()
        .map_err(|_| MoveError::NotANumber(token.to_string()))?;
    u32::try_from(number)
        .ok()
        .and_then(Position::from_move_number)
        .ok_or(MoveError::OutOfRange(number))
}

/// True iff `pos` is on the board and its cell is empty.
pub fn validate_move(board: &Board, pos: Position) -> bool {
    pos.in_bounds() && board.get(pos) == Some(Cell::Empty)
}

/// Parses and validates a move token against `board` in one step.
#[instrument(skip(board))]
pub fn check_move(board: &Board, input: &str) -> Result<Position, MoveError> {
    let pos = parse_move(input)?;
    if validate_move(board, pos) {
        Ok(pos)
    } else {
        Err(MoveError::Occupied(pos.move_number()))
    }
}

/// Places `mark` at `pos`.
///
/// Callers validate first; this does not re-check occupancy.
pub fn apply_move(board: &mut Board, pos: Position, mark: Mark) {
    board.set(pos, Cell::Occupied(mark));
}

/// Returns the mark holding a complete line, if any.
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.into_iter().find_map(|line| {
        let [a, b, c] = line.map(|(row, col)| board.get(Position::new(row, col)));
        match (a, b, c) {
            (Some(Cell::Occupied(m)), Some(x), Some(y))
                if x == Cell::Occupied(m) && y == Cell::Occupied(m) =>
            {
                Some(m)
            }
            _ => None,
        }
    })
}

/// True when no empty cell remains.
pub fn is_full(board: &Board) -> bool {
    board.cells().all(|(_, cell)| cell != Cell::Empty)
}

/// Classifies the board. A win is checked before fullness, so a full
/// board with a line is a win, never a draw.
#[instrument(skip(board))]
pub fn evaluate(board: &Board) -> Evaluation {
    if let Some(mark) = winner(board) {
        Evaluation::Win(mark)
    } else if is_full(board) {
        Evaluation::Draw
    } else {
        Evaluation::Ongoing
    }
}
