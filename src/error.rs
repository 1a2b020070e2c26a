//! Application error types.
//!
//! Every failure the service can produce is one of these variants. Domain
//! variants carry the ids needed to describe the failure; storage failures
//! collapse into `Database` and are reported to clients as internal errors.

use serde::Serialize;
use thiserror::Error;

/// Wire-level error codes returned in `{"error": {"code": ...}}` bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TeamExists,
    #[serde(rename = "PR_EXISTS")]
    PrExists,
    #[serde(rename = "PR_MERGED")]
    PrMerged,
    NotAssigned,
    NoCandidate,
    NotFound,
    InvalidInput,
    MethodNotAllowed,
    Timeout,
    Internal,
}

/// Application-level errors.
///
/// All variants serialize to a structured JSON object, which keeps log
/// output and test assertions readable.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Referenced team, user or pull request is missing, or the user has no team.
    #[error("{resource} not found{}", .id.as_ref().map(|id| format!(": {}", id)).unwrap_or_default())]
    NotFound {
        resource: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// A team with this name already exists.
    #[error("Team already exists: {team_name}")]
    TeamExists { team_name: String },

    /// A pull request with this id already exists.
    #[error("Pull request already exists: {pull_request_id}")]
    PullRequestExists { pull_request_id: String },

    /// The pull request is merged and no longer accepts reviewer changes.
    #[error("Pull request is merged: {pull_request_id}")]
    PullRequestMerged { pull_request_id: String },

    /// The user is not a current reviewer of the pull request.
    #[error("Reviewer {user_id} is not assigned to {pull_request_id}")]
    NotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    /// No active teammate is left to take over the review.
    #[error("No replacement candidate for {user_id} on {pull_request_id}")]
    NoCandidate {
        pull_request_id: String,
        user_id: String,
    },

    /// Request failed validation before reaching the store.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// The route exists but not for this HTTP method.
    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    /// The request did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    pub fn team_exists(team_name: impl Into<String>) -> Self {
        Self::TeamExists {
            team_name: team_name.into(),
        }
    }

    pub fn pull_request_exists(pull_request_id: impl Into<String>) -> Self {
        Self::PullRequestExists {
            pull_request_id: pull_request_id.into(),
        }
    }

    pub fn pull_request_merged(pull_request_id: impl Into<String>) -> Self {
        Self::PullRequestMerged {
            pull_request_id: pull_request_id.into(),
        }
    }

    pub fn not_assigned(pull_request_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NotAssigned {
            pull_request_id: pull_request_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn no_candidate(pull_request_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NoCandidate {
            pull_request_id: pull_request_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn method_not_allowed(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Create a database error with optional operation context.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: None,
        }
    }

    /// Create a database error with operation context.
    pub fn database_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The wire code this error is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::TeamExists { .. } => ErrorCode::TeamExists,
            Self::PullRequestExists { .. } => ErrorCode::PrExists,
            Self::PullRequestMerged { .. } => ErrorCode::PrMerged,
            Self::NotAssigned { .. } => ErrorCode::NotAssigned,
            Self::NoCandidate { .. } => ErrorCode::NoCandidate,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::MethodNotAllowed { .. } => ErrorCode::MethodNotAllowed,
            Self::Timeout => ErrorCode::Timeout,
            Self::Database { .. } | Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Storage or infrastructure failure, as opposed to a domain rejection.
    ///
    /// Transient errors are never retried here; retrying is up to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database { .. } | Self::Internal { .. } | Self::Timeout
        )
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Sqlite(e) => Self::from(e),
            crate::db::DbError::Migration(message) => Self::database_with_op(message, "migration"),
        }
    }
}
