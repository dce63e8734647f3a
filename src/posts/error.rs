use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::{ApiError, ErrorResponse};

/// Service-level errors for posts and comments
///
/// `UpdateFailed`/`DeleteFailed` mean "no row matched id and caller", which
/// covers both a missing resource and one owned by someone else.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("update {0} failed")]
    UpdateFailed(&'static str),

    #[error("delete {0} failed")]
    DeleteFailed(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl PostError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PostError::NotFound => StatusCode::NOT_FOUND,
            PostError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PostError::UpdateFailed(_) | PostError::DeleteFailed(_) | PostError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PostError::NotFound => "NOT_FOUND",
            PostError::UpdateFailed(_) => "UPDATE_FAILED",
            PostError::DeleteFailed(_) => "DELETE_FAILED",
            PostError::ValidationError(_) => "VALIDATION_ERROR",
            PostError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Field-level details are rendered the same way as everywhere else
            PostError::ValidationError(errors) => {
                return ApiError::ValidationError(errors.clone()).into_response();
            }
            PostError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal error occurred".to_string()
            }
            PostError::UpdateFailed(_) | PostError::DeleteFailed(_) => {
                tracing::error!("{}", self);
                self.to_string()
            }
            PostError::NotFound => self.to_string(),
        };

        ErrorResponse::new(self.error_code(), message).into_response_with(self.status_code())
    }
}
