//! Game rule implementations.

pub mod tictactoe;
