//! Read-only aggregate queries.

use crate::models::ReviewerStat;
use sqlx::SqliteConnection;

/// Total, open, and merged pull request counts.
pub async fn pull_request_counts(
    conn: &mut SqliteConnection,
) -> Result<(i64, i64, i64), sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN status = 'OPEN' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'MERGED' THEN 1 ELSE 0 END), 0)
        FROM pull_requests
        "#,
    )
    .fetch_one(conn)
    .await
}

/// Current assignment count for every user, busiest first.
pub async fn reviewer_assignments(
    conn: &mut SqliteConnection,
) -> Result<Vec<ReviewerStat>, sqlx::Error> {
    sqlx::query_as::<_, ReviewerStat>(
        r#"
        SELECT u.user_id, u.username, COUNT(r.pull_request_id) AS assignments
        FROM users u
        LEFT JOIN pr_reviewers r ON r.reviewer_id = u.user_id
        GROUP BY u.user_id, u.username
        ORDER BY assignments DESC, u.user_id
        "#,
    )
    .fetch_all(conn)
    .await
}
