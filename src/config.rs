//! Runtime configuration.
//!
//! Every setting can be given as a command line flag or an environment
//! variable; flags win. A `.env` file in the working directory is loaded
//! by the binary before parsing.

use crate::db::PoolSettings;
use crate::error::AppError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Minimum level of log records that are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "pr-reviewer")]
#[command(about = "Reviewer assignment and pull request lifecycle service")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP server port
    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    pub request_timeout_ms: u64,

    /// How long in-flight requests may run after a shutdown signal
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Log level (RUST_LOG overrides it when set)
    #[arg(long, env = "LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "data/pr-reviewer.db")]
    pub database_path: PathBuf,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// Maximum lifetime of a pooled connection in seconds
    #[arg(long, env = "DB_MAX_CONN_LIFETIME_SECS", default_value_t = 1800)]
    pub db_max_conn_lifetime_secs: u64,
}

impl Config {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.port == 0 {
            return Err(AppError::invalid_input_field("port must not be 0", "port"));
        }
        if self.db_max_connections == 0 {
            return Err(AppError::invalid_input_field(
                "db_max_connections must be at least 1",
                "db_max_connections",
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::invalid_input_field(
                "request_timeout_ms must be positive",
                "request_timeout_ms",
            ));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(AppError::invalid_input_field(
                "shutdown_timeout_secs must be positive",
                "shutdown_timeout_secs",
            ));
        }
        if self.db_max_conn_lifetime_secs == 0 {
            return Err(AppError::invalid_input_field(
                "db_max_conn_lifetime_secs must be positive",
                "db_max_conn_lifetime_secs",
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            max_lifetime: Duration::from_secs(self.db_max_conn_lifetime_secs),
            ..PoolSettings::default()
        }
    }
}
