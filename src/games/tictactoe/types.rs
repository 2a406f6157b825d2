//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};
use strum::EnumIter;
use tracing::instrument;

/// Contents of a single board cell.
///
/// Persisted as a small integer: `0` blank, `1` X, `2` O.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, derive_more::Display,
)]
pub enum Tile {
    /// Empty cell.
    #[default]
    #[display("_")]
    Blank,
    /// Cell taken by X.
    #[display("X")]
    X,
    /// Cell taken by O.
    #[display("O")]
    O,
}

impl Tile {
    /// Returns the storage code for this tile.
    pub fn code(self) -> u8 {
        match self {
            Tile::Blank => 0,
            Tile::X => 1,
            Tile::O => 2,
        }
    }

    /// Decodes a storage code, rejecting anything outside `0..=2`.
    #[instrument]
    pub fn from_code(code: i64) -> Result<Self, StateError> {
        match code {
            0 => Ok(Tile::Blank),
            1 => Ok(Tile::X),
            2 => Ok(Tile::O),
            other => Err(StateError::UnknownTileCode(other)),
        }
    }

    /// Returns the tile with X and O exchanged. Blank stays blank.
    pub fn swapped(self) -> Self {
        match self {
            Tile::Blank => Tile::Blank,
            Tile::X => Tile::O,
            Tile::O => Tile::X,
        }
    }

    /// Returns the mark occupying this tile, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Tile::Blank => None,
            Tile::X => Some(Mark::X),
            Tile::O => Some(Mark::O),
        }
    }
}

/// A player's mark. Only X and O can ever hold the turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, derive_more::Display,
)]
pub enum Mark {
    /// Player X (goes first).
    X,
    /// Player O (goes second; the computer in single-player games).
    O,
}

impl Mark {
    /// Returns the opponent's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl From<Mark> for Tile {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Tile::X,
            Mark::O => Tile::O,
        }
    }
}

/// A cell address on the 3x3 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("({row}, {col})")]
pub struct Cell {
    row: usize,
    col: usize,
}

impl Cell {
    /// Every cell in row-major order.
    pub const ALL: [Cell; 9] = [
        Cell { row: 0, col: 0 },
        Cell { row: 0, col: 1 },
        Cell { row: 0, col: 2 },
        Cell { row: 1, col: 0 },
        Cell { row: 1, col: 1 },
        Cell { row: 1, col: 2 },
        Cell { row: 2, col: 0 },
        Cell { row: 2, col: 1 },
        Cell { row: 2, col: 2 },
    ];

    /// Creates a cell, or `None` if either coordinate is outside `0..=2`.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < 3 && col < 3).then_some(Self { row, col })
    }

    /// Row index (0-2).
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index (0-2).
    pub fn col(self) -> usize {
        self.col
    }
}

/// 3x3 tic-tac-toe board, addressed by row then column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    rows: [[Tile; 3]; 3],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board from explicit rows.
    pub fn from_rows(rows: [[Tile; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Returns the rows in row-major order.
    pub fn rows(&self) -> &[[Tile; 3]; 3] {
        &self.rows
    }

    /// Gets the tile at a cell.
    pub fn get(&self, cell: Cell) -> Tile {
        self.rows[cell.row][cell.col]
    }

    /// Sets the tile at a cell.
    pub fn set(&mut self, cell: Cell, tile: Tile) {
        self.rows[cell.row][cell.col] = tile;
    }

    /// Checks whether a cell is blank.
    pub fn is_blank(&self, cell: Cell) -> bool {
        self.get(cell) == Tile::Blank
    }

    /// Blank cells in row-major order.
    pub fn blank_cells(&self) -> Vec<Cell> {
        Cell::ALL
            .iter()
            .copied()
            .filter(|&cell| self.is_blank(cell))
            .collect()
    }

    /// Counts the cells holding `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.rows.iter().flatten().filter(|&&t| t == tile).count()
    }

    /// Returns a copy with every X and O exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            rows: self.rows.map(|row| row.map(Tile::swapped)),
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (r, row) in self.rows.iter().enumerate() {
            writeln!(f, "{}|{}|{}", row[0], row[1], row[2])?;
            if r < 2 {
                writeln!(f, "-+-+-")?;
            }
        }
        Ok(())
    }
}

/// Number of human players in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Players {
    /// Human (X) against the computer (O).
    One,
    /// Two humans taking turns.
    Two,
}

impl Players {
    /// Returns the stored player count.
    pub fn count(self) -> u8 {
        match self {
            Players::One => 1,
            Players::Two => 2,
        }
    }

    /// Decodes a stored player count.
    #[instrument]
    pub fn from_count(count: i64) -> Result<Self, StateError> {
        match count {
            1 => Ok(Players::One),
            2 => Ok(Players::Two),
            other => Err(StateError::InvalidPlayers(other)),
        }
    }
}

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// No winner yet and at least one blank cell.
    Ongoing,
    /// A player completed a line.
    Won(Mark),
    /// Board full with no winner.
    Drawn,
}

impl GameStatus {
    /// Won and Drawn accept no further moves.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

/// Persisted or reconstructed state that cannot describe a legal game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StateError {
    /// Tile code outside `0..=2`.
    #[display("Unknown tile code {}", _0)]
    UnknownTileCode(i64),

    /// Turn holds something other than X or O.
    #[display("Turn must be X or O, found {}", _0)]
    InvalidTurn(Tile),

    /// Player count other than 1 or 2.
    #[display("Player count must be 1 or 2, found {}", _0)]
    InvalidPlayers(i64),

    /// Piece counts no legal sequence of moves can produce.
    #[display("Impossible piece counts: {} X, {} O", x, o)]
    PieceCount {
        /// Number of X tiles.
        x: usize,
        /// Number of O tiles.
        o: usize,
    },

    /// Turn disagrees with whose move the piece counts imply.
    #[display("Turn is {} but piece counts imply {}", stored, expected)]
    TurnMismatch {
        /// Turn as stored.
        stored: Mark,
        /// Turn implied by the board.
        expected: Mark,
    },

    /// Stored winner disagrees with the board.
    #[display("Stored winner {} but board shows {}", stored, detected)]
    WinnerMismatch {
        /// Winner as stored.
        stored: Tile,
        /// Winner detected on the board.
        detected: Tile,
    },
}

impl std::error::Error for StateError {}
