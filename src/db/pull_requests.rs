//! Database queries for pull requests and their reviewer assignments.

use crate::models::pull_request::PullRequestRow;
use crate::models::{PullRequest, PullRequestShort};
use sqlx::SqliteConnection;

/// Check whether a pull request with this id exists.
pub async fn exists(conn: &mut SqliteConnection, pull_request_id: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM pull_requests WHERE pull_request_id = ?")
        .bind(pull_request_id)
        .fetch_optional(conn)
        .await?;

    Ok(row.is_some())
}

/// Insert the pull request row and one `pr_reviewers` row per reviewer.
///
/// Callers run this inside a transaction so the reviewer rows never exist
/// without their pull request, or the other way round.
pub async fn insert(conn: &mut SqliteConnection, pr: &PullRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO pull_requests
            (pull_request_id, pull_request_name, author_id, status, created_at, merged_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&pr.pull_request_id)
    .bind(&pr.pull_request_name)
    .bind(&pr.author_id)
    .bind(pr.status)
    .bind(pr.created_at.timestamp_millis())
    .bind(pr.merged_at.map(|t| t.timestamp_millis()))
    .execute(&mut *conn)
    .await?;

    for (position, reviewer_id) in pr.assigned_reviewers.iter().enumerate() {
        sqlx::query(
            "INSERT INTO pr_reviewers (pull_request_id, reviewer_id, position) VALUES (?, ?, ?)",
        )
        .bind(&pr.pull_request_id)
        .bind(reviewer_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Reviewer ids of a pull request in slot order.
pub async fn reviewers(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY position",
    )
    .bind(pull_request_id)
    .fetch_all(conn)
    .await
}

/// Load a pull request with its reviewer set.
pub async fn get(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> Result<Option<PullRequest>, sqlx::Error> {
    let row: Option<PullRequestRow> = sqlx::query_as(
        r#"
        SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
        FROM pull_requests
        WHERE pull_request_id = ?
        "#,
    )
    .bind(pull_request_id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let reviewers = reviewers(conn, pull_request_id).await?;
            Ok(Some(row.with_reviewers(reviewers)))
        }
        None => Ok(None),
    }
}

/// Move an open pull request to `MERGED`.
///
/// Returns `false` when nothing changed, either because the pull request is
/// missing or because it was already merged.
pub async fn mark_merged(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    merged_at_millis: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE pull_requests
        SET status = 'MERGED', merged_at = ?
        WHERE pull_request_id = ? AND status = 'OPEN'
        "#,
    )
    .bind(merged_at_millis)
    .bind(pull_request_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Swap `old_reviewer_id` for `new_reviewer_id`, keeping its slot.
///
/// The update only applies while the old reviewer is still assigned and the
/// pull request is still open. Returns `false` if either no longer holds.
/// The `(pull_request_id, reviewer_id)` key rejects a new reviewer who
/// already holds the other slot.
pub async fn replace_reviewer(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    old_reviewer_id: &str,
    new_reviewer_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE pr_reviewers
        SET reviewer_id = ?
        WHERE pull_request_id = ?
          AND reviewer_id = ?
          AND EXISTS (
              SELECT 1 FROM pull_requests
              WHERE pull_request_id = ? AND status = 'OPEN'
          )
        "#,
    )
    .bind(new_reviewer_id)
    .bind(pull_request_id)
    .bind(old_reviewer_id)
    .bind(pull_request_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Pull requests on which `user_id` is currently a reviewer, oldest first.
pub async fn by_reviewer(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<PullRequestShort>, sqlx::Error> {
    sqlx::query_as::<_, PullRequestShort>(
        r#"
        SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
        FROM pull_requests pr
        JOIN pr_reviewers r ON r.pull_request_id = pr.pull_request_id
        WHERE r.reviewer_id = ?
        ORDER BY pr.created_at, pr.pull_request_id
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}
