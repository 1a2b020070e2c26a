//! Business logic services.
//!
//! This module contains the reviewer assignment rules, the pull request
//! lifecycle, and the HTTP server that exposes them.
//!
//! Apart from `server`, services are independent of axum and are tested
//! directly against a SQLite database.

pub mod assignment;
pub mod directory;
pub mod pull_requests;
pub mod server;
pub mod stats;

pub use pull_requests::Reassignment;
pub use server::{build_router, AppState};
