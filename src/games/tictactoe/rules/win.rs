//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Tile};
use tracing::instrument;

/// Every winning line: three rows, three columns, two diagonals.
pub const LINES: [[Cell; 3]; 8] = {
    let c = Cell::ALL;
    [
        // Rows
        [c[0], c[1], c[2]],
        [c[3], c[4], c[5]],
        [c[6], c[7], c[8]],
        // Columns
        [c[0], c[3], c[6]],
        [c[1], c[4], c[7]],
        [c[2], c[5], c[8]],
        // Diagonals
        [c[0], c[4], c[8]],
        [c[2], c[4], c[6]],
    ]
};

/// Returns the mark holding a complete line, or [`Tile::Blank`] if none does.
///
/// Lines are scanned rows, then columns, then diagonals; the first complete
/// line decides. Legal play never completes lines for both marks at once.
#[instrument(level = "trace")]
pub fn check_winner(board: &Board) -> Tile {
    LINES
        .iter()
        .map(|&[a, b, c]| (board.get(a), board.get(b), board.get(c)))
        .find(|&(a, b, c)| a != Tile::Blank && a == b && b == c)
        .map_or(Tile::Blank, |(a, _, _)| a)
}
