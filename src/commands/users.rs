//! User handlers.

use crate::commands::{require, ApiErr};
use crate::models::{PullRequestShort, User};
use crate::services::directory;
use crate::services::server::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Body of `POST /users/setIsActive`.
#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    #[serde(default)]
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Pull requests a user is currently reviewing.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
}

/// POST /users/setIsActive: toggle reviewer eligibility.
async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let Json(request) = payload?;
    require("user_id", &request.user_id)?;

    let user = directory::set_active(&state.db, &request.user_id, request.is_active).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=: review inbox.
async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<ReviewResponse>, ApiErr> {
    let Query(query) = query?;
    require("user_id", &query.user_id)?;

    let pull_requests = directory::review_queue(&state.db, &query.user_id).await?;
    Ok(Json(ReviewResponse {
        user_id: query.user_id,
        pull_requests,
    }))
}
