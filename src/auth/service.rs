// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{User, UserProfile},
    repository::UserStore,
    token::{TokenPair, TokenService, TokenType},
};

/// Authentication service coordinating all auth operations
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Login-or-register by username.
    ///
    /// An unseen username (compared case-insensitively) creates a user; either
    /// way a fresh token pair is issued for the resolved user.
    pub async fn login(&self, username: &str) -> Result<TokenPair, AuthError> {
        info!("login: username={}", username);

        let user_id = match self.users.find_by_username(username).await? {
            Some(user) => user.id,
            None => self.register(username).await?,
        };

        self.tokens.issue_pair(user_id)
    }

    async fn register(&self, username: &str) -> Result<Uuid, AuthError> {
        let user = User::register(username);
        if self.users.insert_user(&user).await? {
            info!("Registered new user: id={}, username={}", user.id, username);
            return Ok(user.id);
        }

        // Another login created the same username between lookup and insert
        warn!("Concurrent registration for username={}, reusing winner", username);
        self.users
            .find_by_username(username)
            .await?
            .map(|winner| winner.id)
            .ok_or_else(|| {
                AuthError::DatabaseError(format!("user '{}' vanished after conflict", username))
            })
    }

    /// Exchange a refresh token for a brand-new token pair.
    ///
    /// The presented token stays valid until its own expiry.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .tokens
            .decode_as(refresh_token, TokenType::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| {
                warn!("refresh: user {} no longer exists", claims.user_id);
                AuthError::UserNotFound
            })?;

        info!("refresh: user_id={}", user.id);
        self.tokens.issue_pair(user.id)
    }

    /// Get current user information
    pub async fn get_current_user(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }
}
