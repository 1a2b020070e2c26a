//! Pull request lifecycle.
//!
//! Each operation reads, decides, and writes inside a single transaction.
//! The transaction rolls back when dropped, so an error or a cancelled
//! request never leaves a pull request without its reviewer rows.
//!
//! State machine: `OPEN` -> `MERGED`. Merging twice is a no-op; reviewer
//! changes are only accepted while `OPEN`.

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::{PullRequest, PullRequestStatus};
use crate::services::{assignment, directory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

/// Result of a successful reviewer reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// Current time at the millisecond precision the store keeps.
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap_or_default()
}

async fn load(conn: &mut SqliteConnection, pull_request_id: &str) -> Result<PullRequest, AppError> {
    db::pull_requests::get(conn, pull_request_id)
        .await?
        .ok_or_else(|| AppError::not_found_with_id("PullRequest", pull_request_id))
}

/// Create an open pull request and assign up to two reviewers from the
/// author's team.
///
/// # Errors
/// * `PullRequestExists` - the id is taken
/// * `NotFound` - the author does not exist or has no team
pub async fn create_pull_request(
    pool: &DbPool,
    pull_request_id: &str,
    pull_request_name: &str,
    author_id: &str,
) -> Result<PullRequest, AppError> {
    let mut tx = db::begin_write(pool).await?;

    if db::pull_requests::exists(&mut tx, pull_request_id).await? {
        return Err(AppError::pull_request_exists(pull_request_id));
    }

    let author = directory::get_user(&mut tx, author_id).await?;
    let team_name = directory::team_of(&author)?;
    let candidates = directory::candidate_pool(&mut tx, team_name).await?;
    let reviewers = assignment::select_initial_reviewers(&candidates, author_id);

    let pr = PullRequest {
        pull_request_id: pull_request_id.to_string(),
        pull_request_name: pull_request_name.to_string(),
        author_id: author_id.to_string(),
        status: PullRequestStatus::Open,
        assigned_reviewers: reviewers,
        created_at: now(),
        merged_at: None,
    };

    // The primary key settles a race between two creates of the same id
    db::pull_requests::insert(&mut tx, &pr).await.map_err(|e| {
        let duplicate = e
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if duplicate {
            AppError::pull_request_exists(pull_request_id)
        } else {
            AppError::from(e)
        }
    })?;

    tx.commit().await?;

    log::info!(
        "Created pull request {} by {} with reviewers {:?}",
        pr.pull_request_id,
        pr.author_id,
        pr.assigned_reviewers
    );

    Ok(pr)
}

/// Merge a pull request.
///
/// Merging an already merged pull request returns it unchanged.
///
/// # Errors
/// * `NotFound` - no such pull request
pub async fn merge_pull_request(
    pool: &DbPool,
    pull_request_id: &str,
) -> Result<PullRequest, AppError> {
    let mut tx = db::begin_write(pool).await?;

    let pr = load(&mut tx, pull_request_id).await?;
    if pr.is_merged() {
        return Ok(pr);
    }

    // Only flips OPEN rows, so a concurrent merge keeps the first timestamp
    db::pull_requests::mark_merged(&mut tx, pull_request_id, now().timestamp_millis()).await?;

    let merged = load(&mut tx, pull_request_id).await?;
    tx.commit().await?;

    log::info!("Merged pull request {}", pull_request_id);
    Ok(merged)
}

/// Replace `old_reviewer_id` with the next eligible member of the old
/// reviewer's team. The new reviewer takes the same slot.
///
/// # Errors
/// * `NotFound` - no such pull request, old reviewer missing, or old reviewer has no team
/// * `PullRequestMerged` - the pull request is merged
/// * `NotAssigned` - `old_reviewer_id` is not a current reviewer
/// * `NoCandidate` - nobody eligible is left in the team
pub async fn reassign_reviewer(
    pool: &DbPool,
    pull_request_id: &str,
    old_reviewer_id: &str,
) -> Result<Reassignment, AppError> {
    let mut tx = db::begin_write(pool).await?;

    let pr = load(&mut tx, pull_request_id).await?;
    if pr.is_merged() {
        return Err(AppError::pull_request_merged(pull_request_id));
    }
    if !pr.has_reviewer(old_reviewer_id) {
        return Err(AppError::not_assigned(pull_request_id, old_reviewer_id));
    }

    let old_reviewer = directory::get_user(&mut tx, old_reviewer_id).await?;
    let team_name = directory::team_of(&old_reviewer)?;
    let candidates = directory::candidate_pool(&mut tx, team_name).await?;

    let mut exclude: Vec<&str> = pr.assigned_reviewers.iter().map(String::as_str).collect();
    exclude.push(&pr.author_id);

    let new_reviewer_id = assignment::select_replacement(&candidates, &exclude, old_reviewer_id)
        .ok_or_else(|| AppError::no_candidate(pull_request_id, old_reviewer_id))?;

    let swapped = db::pull_requests::replace_reviewer(
        &mut tx,
        pull_request_id,
        old_reviewer_id,
        &new_reviewer_id,
    )
    .await?;

    if !swapped {
        // What we read no longer holds; report the state that changed.
        let current = load(&mut tx, pull_request_id).await?;
        return Err(if current.is_merged() {
            AppError::pull_request_merged(pull_request_id)
        } else {
            AppError::not_assigned(pull_request_id, old_reviewer_id)
        });
    }

    let updated = load(&mut tx, pull_request_id).await?;
    tx.commit().await?;

    log::info!(
        "Reassigned reviewer on pull request {}: {} -> {}",
        pull_request_id,
        old_reviewer_id,
        new_reviewer_id
    );

    Ok(Reassignment {
        pr: updated,
        replaced_by: new_reviewer_id,
    })
}

/// Get a pull request by id.
pub async fn get_pull_request(
    pool: &DbPool,
    pull_request_id: &str,
) -> Result<PullRequest, AppError> {
    let mut conn = pool.acquire().await?;
    load(&mut conn, pull_request_id).await
}
