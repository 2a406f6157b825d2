//! Session state machine for tic-tac-toe.

use super::rules::{check_winner, is_full};
use super::types::{Board, Cell, GameStatus, Mark, Players, StateError, Tile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Unique, positive session identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct SessionId(i32);

impl SessionId {
    /// Returns the raw identifier.
    pub fn get(self) -> i32 {
        self.0
    }
}

/// Error that can occur when validating or choosing a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// Row or column outside `0..=2`.
    #[display("Cell ({}, {}) is off the board", row, col)]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The cell already holds a mark.
    #[display("Cell ({}, {}) is already occupied", row, col)]
    CellOccupied {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The session already has a winner.
    #[display("Game already won by {}", _0)]
    GameAlreadyWon(Mark),

    /// No blank cell is left for the computer to take.
    #[display("No available moves")]
    NoAvailableMoves,
}

impl std::error::Error for MoveError {}

/// One game: board, whose turn it is, winner, and player count.
///
/// Fields are private; a session only changes through [`GameSession::apply_move`],
/// so `turn` is always X or O and the piece counts always describe a legal game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSession {
    id: SessionId,
    board: Board,
    turn: Mark,
    winner: Tile,
    players: Players,
}

impl GameSession {
    /// Creates a fresh session: empty board, X to move, no winner.
    #[instrument]
    pub fn new(id: SessionId, players: Players) -> Self {
        debug!("Creating session state");
        Self {
            id,
            board: Board::new(),
            turn: Mark::X,
            winner: Tile::Blank,
            players,
        }
    }

    /// Rebuilds a session from stored fields, rejecting states no legal game reaches.
    #[instrument(skip(board))]
    pub fn restore(
        id: SessionId,
        board: Board,
        turn: Tile,
        winner: Tile,
        players: Players,
    ) -> Result<Self, StateError> {
        let turn = turn.mark().ok_or(StateError::InvalidTurn(turn))?;

        let x = board.count(Tile::X);
        let o = board.count(Tile::O);
        let expected = match x.checked_sub(o) {
            Some(0) => Mark::X,
            Some(1) => Mark::O,
            _ => return Err(StateError::PieceCount { x, o }),
        };
        if turn != expected {
            return Err(StateError::TurnMismatch {
                stored: turn,
                expected,
            });
        }

        let detected = check_winner(&board);
        if winner != detected {
            return Err(StateError::WinnerMismatch {
                stored: winner,
                detected,
            });
        }

        Ok(Self {
            id,
            board,
            turn,
            winner,
            players,
        })
    }

    /// Returns the session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns whose move is next.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Returns the winner, or [`Tile::Blank`] if nobody has won.
    pub fn winner(&self) -> Tile {
        self.winner
    }

    /// Returns the player count.
    pub fn players(&self) -> Players {
        self.players
    }

    /// Returns where the game stands.
    pub fn status(&self) -> GameStatus {
        match self.winner.mark() {
            Some(mark) => GameStatus::Won(mark),
            None if is_full(&self.board) => GameStatus::Drawn,
            None => GameStatus::Ongoing,
        }
    }

    /// Won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Places the current turn's mark at `(row, col)`.
    ///
    /// Checks run in order: bounds, occupied cell, existing winner. A drawn
    /// board has no blank cells, so it is rejected as occupied. On failure the
    /// session is left untouched.
    #[instrument(skip(self), fields(session_id = %self.id, turn = %self.turn))]
    pub fn apply_move(&mut self, row: usize, col: usize) -> Result<(), MoveError> {
        let cell = Cell::new(row, col).ok_or_else(|| {
            warn!("Move off the board");
            MoveError::OutOfBounds { row, col }
        })?;

        if !self.board.is_blank(cell) {
            warn!(tile = %self.board.get(cell), "Cell already occupied");
            return Err(MoveError::CellOccupied { row, col });
        }

        if let Some(mark) = self.winner.mark() {
            warn!(winner = %mark, "Move after game was won");
            return Err(MoveError::GameAlreadyWon(mark));
        }

        self.board.set(cell, self.turn.into());
        self.winner = check_winner(&self.board);
        self.turn = self.turn.opponent();

        match self.status() {
            GameStatus::Won(mark) => info!(winner = %mark, "Game won"),
            GameStatus::Drawn => info!("Game drawn"),
            GameStatus::Ongoing => debug!(next = %self.turn, "Move applied"),
        }

        Ok(())
    }
}
