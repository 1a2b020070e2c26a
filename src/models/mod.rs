//! Data models for the application.
//!
//! These models represent the entities stored in the local SQLite database
//! and the JSON shapes returned over HTTP.

pub mod pull_request;
pub mod stats;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{PullRequest, PullRequestShort, PullRequestStatus};
pub use stats::{ReviewerStat, Stats};
pub use team::{Team, TeamMember};
pub use user::User;
