//! Database layer for the review store.
//!
//! This module handles all storage concerns:
//! - Connection pool management with WAL mode
//! - Embedded schema migrations
//! - Per-entity query functions (`teams`, `users`, `pull_requests`, `stats`)
//!
//! Query functions take a `&mut SqliteConnection` so the services can run
//! several of them inside one transaction.

pub mod pool;
pub mod pull_requests;
pub mod stats;
pub mod teams;
pub mod users;

use sqlx::{Sqlite, Transaction};
use std::path::Path;
use thiserror::Error;

pub use pool::{DbPool, PoolSettings};

/// Database-related errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Embedded migrations, applied in order and recorded by name.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial_schema",
    include_str!("migrations/0001_initial_schema.sql"),
)];

/// Initialize the database with default pool settings.
pub async fn initialize(db_path: &Path) -> Result<DbPool, DbError> {
    initialize_with(db_path, &PoolSettings::default()).await
}

/// Initialize the database: create the file if needed and run migrations.
///
/// # Arguments
/// * `db_path` - Path to the SQLite database file
/// * `settings` - Pool limits
pub async fn initialize_with(db_path: &Path, settings: &PoolSettings) -> Result<DbPool, DbError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbError::Migration(format!("Failed to create database directory: {}", e))
        })?;
    }

    let pool = pool::create_pool(db_path, settings).await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Start a transaction that holds SQLite's write lock from `BEGIN`.
///
/// Under a deferred `BEGIN`, a read-then-write transaction fails with
/// `SQLITE_BUSY` if another writer commits between its read and its write.
/// Taking the lock up front makes concurrent writers wait on the busy
/// timeout instead, so every decision is made on the latest committed state.
pub async fn begin_write(pool: &DbPool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Run all pending database migrations.
///
/// Each migration and its `_migrations` record commit together, so a failed
/// migration leaves no partial schema behind.
async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    for (name, sql) in MIGRATIONS {
        let mut tx = begin_write(pool).await?;

        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

        if applied.is_some() {
            continue;
        }

        log::info!("Applying migration {}", name);

        for statement in parse_sql_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::Migration(format!("{}: {}", name, e)))?;
        }

        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}

/// Split a migration file into individual statements.
///
/// Handles `--` comments, multi-line statements, and semicolons inside
/// parentheses or single-quoted literals.
fn parse_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut paren_depth: i32 = 0;
    let mut in_quote = false;

    for line in sql.lines() {
        if !in_quote && line.trim_start().starts_with("--") {
            continue;
        }

        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\'' => {
                    in_quote = !in_quote;
                    current.push(ch);
                }
                '-' if !in_quote && chars.peek() == Some(&'-') => break,
                '(' if !in_quote => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_quote => {
                    paren_depth = (paren_depth - 1).max(0);
                    current.push(ch);
                }
                ';' if !in_quote && paren_depth == 0 => {
                    let stmt = current.trim().to_string();
                    if !stmt.is_empty() {
                        statements.push(stmt);
                    }
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            current.push(' ');
        }
    }

    let last = current.trim().to_string();
    if !last.is_empty() {
        statements.push(last);
    }

    statements
}
