//! Durable tic-tac-toe - game sessions that survive across requests
//!
//! Two humans, or one human against a heuristic computer opponent, play on a
//! 3x3 board. Every accepted move is written to SQLite before control returns.
//!
//! # Architecture
//!
//! - **Games**: board model, win/draw rules, session state machine, computer opponent
//! - **Db**: diesel repository for session rows
//! - **Session**: store contract and the manager that serializes moves per session
//! - **Config**: store connection parameters
//!
//! # Example
//!
//! ```no_run
//! use durable_tictactoe::{Players, SessionManager, SessionRepository, StoreConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = StoreConfig::default().with_database_url("tictactoe.db");
//! let manager = SessionManager::new(SessionRepository::bootstrap(&config)?);
//!
//! let session = manager.create_session(Players::One)?;
//! let session = manager.play_turn(session.id(), 1, 1)?;
//! println!("{}", session.board());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod games;
mod session;

// Crate-level exports - Configuration
pub use config::{
    BUSY_TIMEOUT_VAR, CONNECT_ATTEMPTS_VAR, CONNECT_BACKOFF_VAR, ConfigError, DATABASE_URL_VAR,
    StoreConfig,
};

// Crate-level exports - Persistence
pub use db::{
    DbError, DbErrorKind, NewSessionRecord, SessionChanges, SessionRecord, SessionRepository,
    decode_board, encode_board,
};

// Crate-level exports - Session management
pub use session::{SessionError, SessionManager, SessionStore};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, Cell, GameSession, GameStatus, Mark, MoveError, Players, SessionId, StateError, Tile,
    choose_move, choose_move_with, rules,
};
