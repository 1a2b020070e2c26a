//! SQLite connection pool with WAL mode.
//!
//! The pool is the only state shared between requests. It bounds the number
//! of open connections and hands each logical operation its own connection
//! or transaction.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Sizing and lifetime limits for the pool.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Upper bound on concurrently open connections.
    pub max_connections: u32,
    /// Connections older than this are closed and replaced.
    pub max_lifetime: Duration,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            max_lifetime: Duration::from_secs(30 * 60),
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Create a new connection pool with WAL mode enabled.
///
/// WAL mode lets readers proceed while a writer holds the lock; writers are
/// serialized by SQLite and wait up to the busy timeout for each other.
///
/// # Arguments
/// * `db_path` - Path to the SQLite database file
/// * `settings` - Pool limits
pub async fn create_pool(db_path: &Path, settings: &PoolSettings) -> Result<DbPool, sqlx::Error> {
    let db_url = format!("sqlite:{}", db_path.display());

    let connect_options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        // Reviewer rows reference users and pull requests
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30))
        .pragma("wal_autocheckpoint", "1000");

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(1)
        .max_lifetime(settings.max_lifetime)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(connect_options)
        .await?;

    let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await?;

    debug_assert!(
        mode.0.to_lowercase() == "wal",
        "WAL mode should be enabled, got: {}",
        mode.0
    );

    Ok(pool)
}
