//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board). Rules are kept apart from
//! session state so the computer opponent can probe hypothetical boards.

mod draw;
mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner};
