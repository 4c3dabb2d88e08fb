//! Application error taxonomy and its mapping onto HTTP responses.
//!
//! Validation failures are user-correctable (400), conflicts describe which
//! side of the repository holds a file (400), missing records are 404, and
//! failures of git, SMTP or the database surface as 500 with the underlying
//! message attached.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::response::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    /// Branch string does not look like `X.Y` or `X.Y.Z`.
    #[error("{0}")]
    InvalidFormat(String),

    /// Path is empty, `null`, or otherwise unusable.
    #[error("{0}")]
    InvalidPath(String),

    /// Any other rejected input.
    #[error("{0}")]
    Validation(String),

    /// The request collides with existing state.
    #[error("{0}")]
    Conflict(String),

    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),

    /// A git operation on a specific branch/file failed.
    #[error("File not found in the specified branch")]
    NotFoundInBranch { branch: String, path: String },

    #[error("Git error: {0}")]
    Git(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap a git failure, keeping the whole context chain in the message
    pub fn git(err: anyhow::Error) -> Self {
        Self::Git(format!("{err:#}"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidFormat(_)
            | Self::InvalidPath(_)
            | Self::Validation(_)
            | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::NotFoundInBranch { .. } => StatusCode::NOT_FOUND,
            Self::Git(_) | Self::Database(_) | Self::Mail(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Report this error as a 500 regardless of its kind, keeping the message
    pub fn into_internal(self) -> Self {
        match self {
            Self::Internal(_) => self,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("I/O error: {err}"))
    }
}
