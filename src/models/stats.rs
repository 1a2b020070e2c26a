//! Aggregate statistics model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of current review assignments held by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReviewerStat {
    pub user_id: String,
    pub username: String,
    pub assignments: i64,
}

/// Service-wide pull request and reviewer counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_pr: i64,
    pub open_pr: i64,
    pub merged_pr: i64,
    pub reviewers: Vec<ReviewerStat>,
}
