// Request identity resolution for protected and identity-aware routes

use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    token::{TokenService, TokenType},
};

/// Identity of the caller, resolved from a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Pull the bearer token out of the Authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Mandatory resolution: any problem with the header or token is an error
pub fn resolve_identity(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<AuthenticatedUser, AuthError> {
    let token = extract_bearer(headers)?;
    let claims = tokens.decode_as(token, TokenType::Access)?;
    Ok(AuthenticatedUser {
        user_id: claims.user_id,
    })
}

/// Optional resolution: never fails, an unusable token means "anonymous"
pub fn resolve_optional_identity(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Option<AuthenticatedUser> {
    match resolve_identity(headers, tokens) {
        Ok(user) => Some(user),
        Err(AuthError::MissingToken) => None,
        Err(err) => {
            debug!("Ignoring unusable credentials on optional route: {}", err);
            None
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        resolve_identity(&parts.headers, &tokens).map_err(|err| {
            warn!(
                "Authentication failed for endpoint {}: {}",
                parts.uri.path(),
                err
            );
            err
        })
    }
}

/// Caller identity for routes that serve anonymous and authenticated callers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl OptionalUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.map(|user| user.user_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        Ok(OptionalUser(resolve_optional_identity(&parts.headers, &tokens)))
    }
}
