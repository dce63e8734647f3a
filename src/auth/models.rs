// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user: new time-ordered id, no profile image
    pub fn register(username: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.to_string(),
            profile_image_url: None,
            created_at: Utc::now(),
        }
    }
}

/// Profile of the calling user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    pub profile_image_url: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            profile_image_url: user.profile_image_url,
        }
    }
}

/// Login request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(
        length(max = 64, message = "username must not exceed 64 characters"),
        custom(function = "crate::validation::validate_not_blank", message = "username is required")
    )]
    #[schema(example = "alice")]
    pub username: String,
}

/// Token refresh request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(custom(
        function = "crate::validation::validate_not_blank",
        message = "refreshToken is required"
    ))]
    pub refresh_token: String,
}
