//! Database error types.

use crate::games::tictactoe::{SessionId, StateError};
use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong talking to the store.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The store could not be reached.
    #[display("connection failed: {}", _0)]
    Connection(String),
    /// A query or write failed.
    #[display("query failed: {}", _0)]
    Query(String),
    /// No row exists for the session.
    #[display("session {} not found", _0)]
    NotFound(SessionId),
    /// A stored row does not decode into a valid session.
    #[display("malformed session state: {}", _0)]
    Malformed(String),
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error: {} at {}:{}", kind, file, line)]
pub struct DbError {
    /// What failed.
    pub kind: DbErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: DbErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a [`DbErrorKind::Malformed`] error.
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Malformed(message.into()))
    }

    /// True when the stored row was readable but not a valid session.
    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, DbErrorKind::Malformed(_))
    }

    /// True when the session has no row.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, DbErrorKind::NotFound(_))
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query(err.to_string()))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection(err.to_string()))
    }
}

impl From<StateError> for DbError {
    #[track_caller]
    fn from(err: StateError) -> Self {
        Self::malformed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(format!("board JSON: {}", err))
    }
}
