//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user of the review service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user id.
    pub user_id: String,

    /// Display name.
    pub username: String,

    /// Team affiliation. A user without a team can neither author nor review.
    pub team_name: Option<String>,

    /// Inactive users are never picked as reviewers.
    pub is_active: bool,
}

impl User {
    /// Whether the user may be drawn from a candidate pool.
    pub fn is_eligible(&self) -> bool {
        self.is_active && self.team_name.is_some()
    }
}
