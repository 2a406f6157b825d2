//! Tic-tac-toe: board model, rules, session state machine, computer opponent.

mod game;
mod opponent;
pub mod rules;
mod types;

pub use game::{GameSession, MoveError, SessionId};
pub use opponent::{choose_move, choose_move_with};
pub use types::{Board, Cell, GameStatus, Mark, Players, StateError, Tile};
