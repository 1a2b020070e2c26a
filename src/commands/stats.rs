//! Stats handler.

use crate::commands::ApiErr;
use crate::models::Stats;
use crate::services::server::AppState;
use crate::services::stats;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /stats: pull request counts and per-user assignment counts.
async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiErr> {
    let stats = stats::get_stats(&state.db).await?;
    Ok(Json(stats))
}
