//! Computer opponent for single-player games.
//!
//! A one-ply greedy rule, not a search: take an immediate win for O if one
//! exists, otherwise block an immediate win for X, otherwise pick a blank cell
//! uniformly at random. Probes run on copies of the board.

use super::game::{GameSession, MoveError};
use super::rules::check_winner;
use super::types::{Board, Cell, Mark, Tile};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

/// Chooses the computer's next cell using the thread-local RNG.
#[instrument(skip(session), fields(session_id = %session.id()))]
pub fn choose_move(session: &GameSession) -> Result<Cell, MoveError> {
    choose_move_with(session.board(), &mut rand::rng())
}

/// Chooses the computer's next cell, drawing any random pick from `rng`.
#[instrument(skip(board, rng))]
pub fn choose_move_with<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Result<Cell, MoveError> {
    let blanks = board.blank_cells();

    if let Some(cell) = completing_cell(board, &blanks, Mark::O) {
        debug!(%cell, "Taking winning cell");
        return Ok(cell);
    }

    if let Some(cell) = completing_cell(board, &blanks, Mark::X) {
        debug!(%cell, "Blocking opponent");
        return Ok(cell);
    }

    let cell = *blanks.choose(rng).ok_or(MoveError::NoAvailableMoves)?;
    debug!(%cell, candidates = blanks.len(), "Picked random cell");
    Ok(cell)
}

/// First blank cell, in row-major order, where `mark` alone completes a line.
fn completing_cell(board: &Board, blanks: &[Cell], mark: Mark) -> Option<Cell> {
    blanks.iter().copied().find(|&cell| {
        let mut probe = *board;
        probe.set(cell, mark.into());
        check_winner(&probe) != Tile::Blank
    })
}
