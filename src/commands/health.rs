use crate::services::server::AppState;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health: liveness only; does not touch the database.
async fn health() -> StatusCode {
    StatusCode::OK
}
