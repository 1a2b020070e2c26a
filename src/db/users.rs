//! Database queries for users.

use crate::models::{TeamMember, User};
use sqlx::SqliteConnection;

/// Create or update each member and bind it to `team_name`.
///
/// Existing users keep their id and take the new name, team, and active flag.
pub async fn upsert_members(
    conn: &mut SqliteConnection,
    team_name: &str,
    members: &[TeamMember],
) -> Result<(), sqlx::Error> {
    for member in members {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                username = excluded.username,
                team_name = excluded.team_name,
                is_active = excluded.is_active
            "#,
        )
        .bind(&member.user_id)
        .bind(&member.username)
        .bind(team_name)
        .bind(member.is_active)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Get a user by id.
pub async fn get(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Active members of a team ordered by user id.
///
/// This ordering is what makes reviewer selection deterministic.
pub async fn active_by_team(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, team_name, is_active
        FROM users
        WHERE team_name = ? AND is_active = 1
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .fetch_all(conn)
    .await
}

/// Set the active flag. Returns `false` if no such user exists.
pub async fn set_active(
    conn: &mut SqliteConnection,
    user_id: &str,
    is_active: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
        .bind(is_active)
        .bind(user_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
