//! Read-only rollups over pull requests and reviewer assignments.

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::Stats;

/// Pull request counts by status and per-user assignment counts.
pub async fn get_stats(pool: &DbPool) -> Result<Stats, AppError> {
    let mut conn = pool.acquire().await?;

    let (total_pr, open_pr, merged_pr) = db::stats::pull_request_counts(&mut conn).await?;
    let reviewers = db::stats::reviewer_assignments(&mut conn).await?;

    Ok(Stats {
        total_pr,
        open_pr,
        merged_pr,
        reviewers,
    })
}
