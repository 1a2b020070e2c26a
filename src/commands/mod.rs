//! HTTP handlers.
//!
//! Handlers are organized by resource:
//! - `teams`: team creation and lookup
//! - `users`: active flag and reviewer inbox
//! - `pull_requests`: create, merge, reassign
//! - `stats`: assignment rollups
//! - `health`: liveness check
//!
//! Handlers parse and validate the request, call one service function, and
//! wrap the result in its response envelope. Failures leave as [`ApiErr`].

pub mod health;
pub mod pull_requests;
pub mod stats;
pub mod teams;
pub mod users;

use crate::error::{AppError, ErrorCode};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

/// JSON error response: `{"error": {"code": ..., "message": ...}}`.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Wrapper to make AppError usable as an axum error response.
#[derive(Debug)]
pub struct ApiErr(pub AppError);

/// HTTP status for each error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::TeamExists | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::PrExists
        | ErrorCode::PrMerged
        | ErrorCode::NotAssigned
        | ErrorCode::NoCandidate => StatusCode::CONFLICT,
        ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::Timeout => StatusCode::REQUEST_TIMEOUT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = status_for(code);

        if self.0.is_transient() {
            log::error!("Request failed: {}", self.0);
        } else {
            log::warn!("Request rejected: {}", self.0);
        }

        // Storage and internal details stay in the log
        let message = if status.is_server_error() {
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

/// Fail with `InvalidInput` naming `field` when `value` is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            format!("{} is required", field),
            field,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::TeamExists), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::PrExists), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::PrMerged), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::NotAssigned), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::NoCandidate), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorCode::MethodNotAllowed),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(status_for(ErrorCode::Timeout), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            status_for(ErrorCode::Internal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_require() {
        assert!(require("team_name", "core").is_ok());

        let err = require("team_name", "  ").unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidInput { field: Some(ref f), .. } if f == "team_name"
        ));
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response = ApiErr(AppError::database("disk I/O error")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INTERNAL");
        assert_eq!(json["error"]["message"], "internal error");
    }

    #[tokio::test]
    async fn test_domain_errors_carry_message() {
        let response = ApiErr(AppError::pull_request_merged("pr1")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "PR_MERGED");
        assert!(json["error"]["message"].as_str().unwrap().contains("pr1"));
    }
}
