// HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{LoginRequest, RefreshRequest, UserProfile},
    token::TokenPair,
};
use crate::AppState;

/// Login (registering on first use)
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    params(("x-api-key" = String, Header, description = "Pre-shared API key")),
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 400, description = "Invalid username", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    request.validate()?;

    let pair = state.auth_service.login(&request.username).await?;
    Ok(Json(pair))
}

/// Refresh tokens
/// POST /auth/token/refresh
#[utoipa::path(
    post,
    path = "/auth/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = TokenPair),
        (status = 400, description = "Blank refresh token", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid refresh token or unknown user", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    request.validate()?;

    let pair = state
        .auth_service
        .refresh_tokens(&request.refresh_token)
        .await
        .map_err(|err| match err {
            // A token for a vanished account is just an unusable token here
            AuthError::UserNotFound => AuthError::InvalidRefreshToken,
            other => other,
        })?;

    Ok(Json(pair))
}

/// Get current user information (protected endpoint)
/// GET /user
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Profile of the caller", body = UserProfile),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, AuthError> {
    let profile = state.auth_service.get_current_user(user.user_id).await?;
    Ok(Json(profile))
}
