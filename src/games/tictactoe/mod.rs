mod rules;
mod types;

pub use rules::{apply_move, check_move, evaluate, is_full, parse_move, validate_move, winner};
pub use types::{Board, Cell, Evaluation, Mark, Position};
