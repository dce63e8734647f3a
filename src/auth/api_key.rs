// Shared-secret gate for the login route

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::error::AuthError;

/// Header carrying the pre-shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Configured API key
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Accept only an exact match of the configured key
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let presented = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::InvalidApiKey)?;

        if presented != &*self.0 {
            return Err(AuthError::InvalidApiKey);
        }
        Ok(())
    }
}

/// Middleware rejecting requests without the configured API key.
/// The wrapped handler never runs for a rejected request.
pub async fn require_api_key(
    State(api_key): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    if let Err(err) = api_key.check(request.headers()) {
        warn!(
            "API key check failed for endpoint: {}",
            request.uri().path()
        );
        return Err(err);
    }

    Ok(next.run(request).await)
}
