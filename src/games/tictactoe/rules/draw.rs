//! Draw detection logic for tic-tac-toe.

use super::super::{Board, Tile};
use super::win::check_winner;
use tracing::instrument;

/// Checks if every cell is taken.
#[instrument(level = "trace")]
pub fn is_full(board: &Board) -> bool {
    board.rows().iter().flatten().all(|&t| t != Tile::Blank)
}

/// A full board with no complete line.
#[instrument(level = "trace")]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && check_winner(board) == Tile::Blank
}
