//! Database queries for teams.

use crate::models::{Team, TeamMember};
use sqlx::SqliteConnection;

/// Check whether a team with this name exists.
pub async fn exists(conn: &mut SqliteConnection, team_name: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(conn)
        .await?;

    Ok(row.is_some())
}

/// Insert a new team row. Fails with a unique violation if the name is taken.
pub async fn insert(conn: &mut SqliteConnection, team_name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
        .bind(team_name)
        .execute(conn)
        .await?;

    Ok(())
}

/// Load a team with all of its members, ordered by user id.
///
/// Returns `None` if the team does not exist.
pub async fn get(conn: &mut SqliteConnection, team_name: &str) -> Result<Option<Team>, sqlx::Error> {
    if !exists(&mut *conn, team_name).await? {
        return Ok(None);
    }

    let members: Vec<TeamMember> = sqlx::query_as(
        r#"
        SELECT user_id, username, is_active
        FROM users
        WHERE team_name = ?
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .fetch_all(conn)
    .await?;

    Ok(Some(Team {
        team_name: team_name.to_string(),
        members,
    }))
}
