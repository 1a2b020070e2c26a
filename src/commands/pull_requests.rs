//! Pull request handlers.

use crate::commands::{require, ApiErr};
use crate::error::AppError;
use crate::models::PullRequest;
use crate::services::pull_requests::{self, Reassignment};
use crate::services::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Body of `POST /pullRequest/create`.
#[derive(Debug, Deserialize)]
pub struct CreatePullRequest {
    #[serde(default)]
    pub pull_request_id: String,
    #[serde(default)]
    pub pull_request_name: String,
    #[serde(default)]
    pub author_id: String,
}

impl CreatePullRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("pull_request_id", &self.pull_request_id)?;
        require("pull_request_name", &self.pull_request_name)?;
        require("author_id", &self.author_id)
    }
}

/// Body of `POST /pullRequest/merge`.
#[derive(Debug, Deserialize)]
pub struct MergePullRequest {
    #[serde(default)]
    pub pull_request_id: String,
}

/// Body of `POST /pullRequest/reassign`.
#[derive(Debug, Deserialize)]
pub struct ReassignReviewer {
    #[serde(default)]
    pub pull_request_id: String,
    #[serde(default)]
    pub old_user_id: String,
}

impl ReassignReviewer {
    pub fn validate(&self) -> Result<(), AppError> {
        require("pull_request_id", &self.pull_request_id)?;
        require("old_user_id", &self.old_user_id)
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestResponse {
    pub pr: PullRequest,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create))
        .route("/pullRequest/merge", post(merge))
        .route("/pullRequest/reassign", post(reassign))
}

/// POST /pullRequest/create: open a pull request and assign reviewers.
async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let pr = pull_requests::create_pull_request(
        &state.db,
        &request.pull_request_id,
        &request.pull_request_name,
        &request.author_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// POST /pullRequest/merge: merge; repeat calls return the merged state.
async fn merge(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiErr> {
    let Json(request) = payload?;
    require("pull_request_id", &request.pull_request_id)?;

    let pr = pull_requests::merge_pull_request(&state.db, &request.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr }))
}

/// POST /pullRequest/reassign: replace one reviewer.
async fn reassign(
    State(state): State<AppState>,
    payload: Result<Json<ReassignReviewer>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let reassignment = pull_requests::reassign_reviewer(
        &state.db,
        &request.pull_request_id,
        &request.old_user_id,
    )
    .await?;

    Ok(Json(reassignment))
}
