//! Durable game sessions: the store contract and the manager built on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use derive_more::{Display, Error, From};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, SessionRepository};
use crate::games::tictactoe::{
    Cell, GameSession, Mark, MoveError, Players, SessionId, choose_move,
};

/// Persistence contract the manager writes through.
pub trait SessionStore {
    /// Allocates the next identifier and stores a fresh session.
    fn create_session(&self, players: Players) -> Result<GameSession, DbError>;

    /// Loads the session with the given identifier.
    fn load_session(&self, id: SessionId) -> Result<GameSession, DbError>;

    /// Overwrites the stored state of an existing session.
    fn save_session(&self, session: &GameSession) -> Result<(), DbError>;
}

impl SessionStore for SessionRepository {
    fn create_session(&self, players: Players) -> Result<GameSession, DbError> {
        SessionRepository::create_session(self, players)
    }

    fn load_session(&self, id: SessionId) -> Result<GameSession, DbError> {
        SessionRepository::load_session(self, id)
    }

    fn save_session(&self, session: &GameSession) -> Result<(), DbError> {
        SessionRepository::save_session(self, session)
    }
}

/// Error returned by [`SessionManager`] operations.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// The move was rejected; nothing was written.
    #[display("{}", _0)]
    Move(MoveError),
    /// The store failed or held a malformed row.
    #[display("{}", _0)]
    Store(DbError),
}

impl SessionError {
    /// Returns the move rejection, if that is what this is.
    pub fn as_move(&self) -> Option<&MoveError> {
        match self {
            SessionError::Move(e) => Some(e),
            SessionError::Store(_) => None,
        }
    }

    /// Returns the store failure, if that is what this is.
    pub fn as_store(&self) -> Option<&DbError> {
        match self {
            SessionError::Store(e) => Some(e),
            SessionError::Move(_) => None,
        }
    }
}

/// Creates, loads, and advances persisted sessions.
///
/// Moves on the same session are serialized through a per-session mutex held
/// across load, validate, and save, so two callers sharing a manager cannot
/// both move from the same stale state.
#[derive(Debug, Clone)]
pub struct SessionManager<S = SessionRepository> {
    store: S,
    locks: Arc<Mutex<HashMap<SessionId, Arc<Mutex<()>>>>>,
}

impl<S: SessionStore> SessionManager<S> {
    /// Creates a manager over the given store.
    #[instrument(skip(store))]
    pub fn new(store: S) -> Self {
        info!("Creating session manager");
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts a new game and persists it.
    #[instrument(skip(self))]
    pub fn create_session(&self, players: Players) -> Result<GameSession, SessionError> {
        let session = self.store.create_session(players)?;
        info!(session_id = %session.id(), "Session started");
        Ok(session)
    }

    /// Loads a snapshot of a session.
    #[instrument(skip(self))]
    pub fn load_session(&self, id: SessionId) -> Result<GameSession, SessionError> {
        Ok(self.store.load_session(id)?)
    }

    /// Applies one move for whoever holds the turn and persists the result.
    ///
    /// Exactly one write on success, none on failure.
    #[instrument(skip(self))]
    pub fn apply_move(
        &self,
        id: SessionId,
        row: usize,
        col: usize,
    ) -> Result<GameSession, SessionError> {
        self.with_session_lock(id, || {
            let mut session = self.store.load_session(id)?;
            self.advance(&mut session, row, col)?;
            Ok(session)
        })
    }

    /// Plays a human move and, in single-player games, the computer's reply as O.
    ///
    /// The reply is skipped once the human's move ends the game. Each applied
    /// move is persisted on its own. A single-player session loaded with O to
    /// move still owes the computer's reply from an earlier turn whose write
    /// failed; that reply is played and persisted before the human move, so
    /// the human always plays X.
    #[instrument(skip(self))]
    pub fn play_turn(
        &self,
        id: SessionId,
        row: usize,
        col: usize,
    ) -> Result<GameSession, SessionError> {
        self.with_session_lock(id, || {
            let mut session = self.store.load_session(id)?;
            if computer_to_move(&session) {
                info!("Playing computer reply left over from an earlier turn");
                self.computer_reply(&mut session)?;
            }

            self.advance(&mut session, row, col)?;

            if computer_to_move(&session) {
                self.computer_reply(&mut session)?;
            }
            Ok(session)
        })
    }

    /// Picks the computer's next cell for a session snapshot.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn choose_computer_move(&self, session: &GameSession) -> Result<Cell, SessionError> {
        Ok(choose_move(session)?)
    }

    /// Applies a move in memory and writes it through, restoring the
    /// in-memory copy if the write fails.
    fn advance(
        &self,
        session: &mut GameSession,
        row: usize,
        col: usize,
    ) -> Result<(), SessionError> {
        let before = session.clone();
        session.apply_move(row, col)?;
        if let Err(e) = self.store.save_session(session) {
            warn!(session_id = %session.id(), error = %e, "Move not persisted");
            *session = before;
            return Err(e.into());
        }
        Ok(())
    }

    fn computer_reply(&self, session: &mut GameSession) -> Result<(), SessionError> {
        let reply = choose_move(session)?;
        debug!(%reply, "Computer replying");
        self.advance(session, reply.row(), reply.col())
    }

    /// Runs `f` holding the session's mutex, then drops the map entry if no
    /// other caller is waiting on it.
    fn with_session_lock<T>(&self, id: SessionId, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        drop(lock);

        // Clones are only handed out under the map lock, so a count of one
        // here means nobody else holds or awaits this session's mutex.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(&id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&id);
        }
        result
    }
}

/// True when a single-player session is waiting on the computer's O.
fn computer_to_move(session: &GameSession) -> bool {
    session.players() == Players::One && session.turn() == Mark::O && !session.is_terminal()
}
