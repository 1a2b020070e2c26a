//! Team and user directory.
//!
//! Owns team membership and the `is_active` flag, and answers the
//! "active members of team X" query that reviewer selection draws from.
//! There is no cache: every query reads the store.

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::{PullRequestShort, Team, TeamMember, User};
use sqlx::SqliteConnection;

/// Create a team and upsert its members in one transaction.
///
/// Members that already exist elsewhere move to the new team.
pub async fn create_team(
    pool: &DbPool,
    team_name: &str,
    members: &[TeamMember],
) -> Result<Team, AppError> {
    let mut tx = db::begin_write(pool).await?;

    if db::teams::exists(&mut tx, team_name).await? {
        return Err(AppError::team_exists(team_name));
    }

    db::teams::insert(&mut tx, team_name).await?;
    upsert_members(&mut tx, team_name, members).await?;

    let team = db::teams::get(&mut tx, team_name)
        .await?
        .ok_or_else(|| AppError::internal(format!("team {} missing after insert", team_name)))?;

    tx.commit().await?;

    log::info!(
        "Created team {} with {} members",
        team.team_name,
        team.members.len()
    );

    Ok(team)
}

/// Get a team and its members.
pub async fn get_team(pool: &DbPool, team_name: &str) -> Result<Team, AppError> {
    let mut conn = pool.acquire().await?;

    db::teams::get(&mut conn, team_name)
        .await?
        .ok_or_else(|| AppError::not_found_with_id("Team", team_name))
}

/// Create or update users and bind them to `team_name`.
///
/// Idempotent: applying the same members twice leaves the same rows.
pub async fn upsert_members(
    conn: &mut SqliteConnection,
    team_name: &str,
    members: &[TeamMember],
) -> Result<(), AppError> {
    if !db::teams::exists(&mut *conn, team_name).await? {
        return Err(AppError::not_found_with_id("Team", team_name));
    }

    db::users::upsert_members(conn, team_name, members).await?;
    Ok(())
}

/// Toggle a user's active flag and return the updated user.
///
/// Takes effect for the next candidate pool query.
pub async fn set_active(pool: &DbPool, user_id: &str, is_active: bool) -> Result<User, AppError> {
    let mut tx = db::begin_write(pool).await?;

    if !db::users::set_active(&mut tx, user_id, is_active).await? {
        return Err(AppError::not_found_with_id("User", user_id));
    }

    let user = db::users::get(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::not_found_with_id("User", user_id))?;

    tx.commit().await?;

    log::info!("User {} is_active set to {}", user_id, is_active);
    Ok(user)
}

/// Look up a user, failing with `NotFound` if they do not exist.
pub async fn get_user(conn: &mut SqliteConnection, user_id: &str) -> Result<User, AppError> {
    db::users::get(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found_with_id("User", user_id))
}

/// The team a user authors or reviews for.
///
/// A user without a team has no candidate pool, which is reported as
/// `NotFound` on the team.
pub fn team_of(user: &User) -> Result<&str, AppError> {
    user.team_name
        .as_deref()
        .ok_or_else(|| AppError::not_found_with_id("Team for user", user.user_id.as_str()))
}

/// Active members of `team_name`, ordered by user id.
pub async fn candidate_pool(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<Vec<User>, AppError> {
    Ok(db::users::active_by_team(conn, team_name).await?)
}

/// Pull requests the user currently reviews.
pub async fn review_queue(pool: &DbPool, user_id: &str) -> Result<Vec<PullRequestShort>, AppError> {
    let mut conn = pool.acquire().await?;

    get_user(&mut conn, user_id).await?;
    Ok(db::pull_requests::by_reviewer(&mut conn, user_id).await?)
}
