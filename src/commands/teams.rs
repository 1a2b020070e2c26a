//! Team handlers.

use crate::commands::{require, ApiErr};
use crate::error::AppError;
use crate::models::{Team, TeamMember};
use crate::services::directory;
use crate::services::server::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Body of `POST /team/add`.
#[derive(Debug, Deserialize)]
pub struct AddTeamRequest {
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl AddTeamRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("team_name", &self.team_name)?;
        if self.members.is_empty() {
            return Err(AppError::invalid_input_field(
                "members must not be empty",
                "members",
            ));
        }
        for member in &self.members {
            require("members.user_id", &member.user_id)?;
            require("members.username", &member.username)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    #[serde(default)]
    pub team_name: String,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
}

/// POST /team/add: create a team with its members.
async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<AddTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let team = directory::create_team(&state.db, &request.team_name, &request.members).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=: team and its members.
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let Query(query) = query?;
    require("team_name", &query.team_name)?;

    let team = directory::get_team(&state.db, &query.team_name).await?;
    Ok(Json(team))
}
