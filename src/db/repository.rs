//! Database repository for game sessions.

use std::thread;
use std::time::Duration;

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::config::StoreConfig;
use crate::db::{DbError, DbErrorKind, NewSessionRecord, SessionChanges, SessionRecord, schema};
use crate::games::tictactoe::{GameSession, Players, SessionId};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite-backed repository for game sessions.
///
/// Holds connection parameters only; each operation opens its own connection
/// and drops it before returning.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    database_url: String,
    busy_timeout: Duration,
}

impl SessionRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// Does not touch the database; see [`SessionRepository::bootstrap`].
    #[instrument(skip(database_url), fields(database_url = %database_url))]
    pub fn new(database_url: String, busy_timeout: Duration) -> Self {
        info!("Creating SessionRepository");
        Self {
            database_url,
            busy_timeout,
        }
    }

    /// Connects with bounded retries, then creates the session table if absent.
    ///
    /// Attempts are spaced by the configured fixed backoff. Running it against
    /// an already initialised database is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if every attempt fails or the schema cannot be applied.
    #[instrument(skip(config), fields(database_url = %config.database_url()))]
    pub fn bootstrap(config: &StoreConfig) -> Result<Self, DbError> {
        let repo = Self::new(
            config.database_url().clone(),
            Duration::from_millis(*config.busy_timeout_ms()),
        );
        let attempts = (*config.connect_attempts()).max(1);
        let backoff = Duration::from_millis(*config.connect_backoff_ms());

        let mut conn = None;
        for attempt in 1..=attempts {
            match repo.connection() {
                Ok(c) => {
                    conn = Some(c);
                    break;
                }
                Err(e) if attempt < attempts => {
                    warn!(attempt, attempts, error = %e, "Database not reachable yet");
                    thread::sleep(backoff);
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Giving up on database");
                    return Err(e);
                }
            }
        }
        let mut conn = conn.ok_or_else(|| {
            DbError::new(DbErrorKind::Connection("no connection attempts made".to_string()))
        })?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Query(format!("Migrations failed: {}", e))))?;
        info!(applied = applied.len(), "Session schema ready");

        Ok(repo)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.database_url, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.database_url).map_err(|e| {
            DbError::new(DbErrorKind::Connection(format!(
                "Failed to connect to '{}': {}",
                self.database_url, e
            )))
        })?;
        diesel::sql_query(format!(
            "PRAGMA busy_timeout = {}",
            self.busy_timeout.as_millis()
        ))
        .execute(&mut conn)?;
        Ok(conn)
    }

    /// Allocates the next identifier and stores a fresh session.
    ///
    /// The identifier is one more than the highest stored, or 1 for an empty
    /// table. Allocation and insert share one write transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs, or with
    /// [`DbErrorKind::Query`] once the highest stored identifier is `i32::MAX`.
    #[instrument(skip(self))]
    pub fn create_session(&self, players: Players) -> Result<GameSession, DbError> {
        let mut conn = self.connection()?;

        let session = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let max_id: Option<i32> = schema::game_sessions::table
                .select(diesel::dsl::max(schema::game_sessions::id))
                .get_result(conn)?;
            let next = max_id.unwrap_or(0).checked_add(1).ok_or_else(|| {
                warn!(max_id = ?max_id, "No identifiers left");
                DbError::new(DbErrorKind::Query("session id space exhausted".to_string()))
            })?;
            let id = SessionId::from(next);

            let session = GameSession::new(id, players);
            diesel::insert_into(schema::game_sessions::table)
                .values(NewSessionRecord::from_session(&session)?)
                .execute(conn)?;
            Ok(session)
        })?;

        info!(session_id = %session.id(), players = session.players().count(), "Session created");
        Ok(session)
    }

    /// Loads a session by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbErrorKind::NotFound`] if no row exists, or
    /// [`DbErrorKind::Malformed`] if the row does not describe a legal game.
    #[instrument(skip(self))]
    pub fn load_session(&self, id: SessionId) -> Result<GameSession, DbError> {
        debug!("Loading session");
        let mut conn = self.connection()?;

        let record = schema::game_sessions::table
            .find(id.get())
            .select(SessionRecord::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| DbError::new(DbErrorKind::NotFound(id)))?;

        let session = GameSession::try_from(record).inspect_err(|e| {
            warn!(error = %e, "Stored session is malformed");
        })?;
        debug!(turn = %session.turn(), winner = %session.winner(), "Session loaded");
        Ok(session)
    }

    /// Overwrites the stored row with the session's current state.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbErrorKind::NotFound`] if the row does not
    /// exist, or another kind if the write fails.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn save_session(&self, session: &GameSession) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let changes = SessionChanges::from_session(session, chrono::Utc::now().naive_utc())?;

        let updated = diesel::update(schema::game_sessions::table.find(session.id().get()))
            .set(&changes)
            .execute(&mut conn)?;

        if updated == 0 {
            warn!("Save targeted a missing session");
            return Err(DbError::new(DbErrorKind::NotFound(session.id())));
        }

        debug!(winner = %session.winner(), turn = %session.turn(), "Session saved");
        Ok(())
    }
}
