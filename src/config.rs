//! Store configuration.
//!
//! Precedence, lowest first: defaults, TOML file, environment, explicit overrides.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// Environment variable naming the database path.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable for the startup connection attempt count.
pub const CONNECT_ATTEMPTS_VAR: &str = "TICTACTOE_CONNECT_ATTEMPTS";
/// Environment variable for the delay between connection attempts.
pub const CONNECT_BACKOFF_VAR: &str = "TICTACTOE_CONNECT_BACKOFF_MS";
/// Environment variable for the SQLite busy timeout.
pub const BUSY_TIMEOUT_VAR: &str = "TICTACTOE_BUSY_TIMEOUT_MS";

/// Connection parameters for the session store.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path.
    database_url: String,

    /// Connection attempts at startup before giving up.
    connect_attempts: u32,

    /// Fixed delay between startup attempts, in milliseconds.
    connect_backoff_ms: u64,

    /// How long a write waits on a locked database before failing, in milliseconds.
    busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "tictactoe.db".to_string(),
            connect_attempts: 10,
            connect_backoff_ms: 6_000,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from a TOML file; missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(database_url = %config.database_url, "Config loaded successfully");
        Ok(config)
    }

    /// Overrides fields from the process environment.
    #[instrument(skip(self))]
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overrides fields from `lookup`, which maps a variable name to its value.
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(DATABASE_URL_VAR) {
            self.database_url = url;
        }
        if let Some(raw) = lookup(CONNECT_ATTEMPTS_VAR) {
            self.connect_attempts = parse_var(CONNECT_ATTEMPTS_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CONNECT_BACKOFF_VAR) {
            self.connect_backoff_ms = parse_var(CONNECT_BACKOFF_VAR, &raw)?;
        }
        if let Some(raw) = lookup(BUSY_TIMEOUT_VAR) {
            self.busy_timeout_ms = parse_var(BUSY_TIMEOUT_VAR, &raw)?;
        }
        debug!(config = ?self, "Environment applied");
        Ok(self)
    }

    /// Replaces the database path.
    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }

    /// Replaces the startup retry policy.
    pub fn with_retry(mut self, connect_attempts: u32, connect_backoff_ms: u64) -> Self {
        self.connect_attempts = connect_attempts;
        self.connect_backoff_ms = connect_backoff_ms;
        self
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::new(format!("Invalid {}='{}': {}", name, raw, e)))
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
