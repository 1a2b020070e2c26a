//! PR Reviewer - reviewer assignment and pull request lifecycle service.
//!
//! Teams of users author pull requests; each new pull request gets up to two
//! active reviewers from the author's team. Reviewers can be swapped for
//! another teammate until the pull request is merged.
//!
//! The library exposes the service layer for direct use and the axum router
//! built on top of it. The `pr-reviewer` binary wires both to configuration.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, ErrorCode};
