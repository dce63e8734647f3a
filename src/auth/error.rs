// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::error::{ApiError, ErrorResponse};

/// Authentication and authorization error types
///
/// Token failures are deliberately coarse: a forged, malformed, expired or
/// wrong-kind token all surface as `InvalidToken`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("API key is missing or invalid")]
    InvalidApiKey,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid access token")]
    InvalidToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidApiKey
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::TokenGenerationError(_) | AuthError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code sent to clients
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::ValidationError(_) => "VALIDATION_ERROR",
            AuthError::InvalidApiKey => "INVALID_API_KEY",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::TokenGenerationError(_) => "INTERNAL_ERROR",
            AuthError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Get a descriptive error message for this error
    /// This message is safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::TokenGenerationError(_) | AuthError::DatabaseError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::ValidationError(errors) => {
                return ApiError::ValidationError(errors.clone()).into_response();
            }
            AuthError::InvalidApiKey
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::InvalidRefreshToken => warn!("Rejected request: {}", self),
            AuthError::TokenGenerationError(msg) => error!("Token generation error: {}", msg),
            AuthError::DatabaseError(msg) => error!("Database error in auth: {}", msg),
            _ => {}
        }

        ErrorResponse::new(self.error_code(), self.error_message())
            .into_response_with(self.status_code())
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}
