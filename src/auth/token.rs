// JWT token generation and validation service

use crate::{auth::error::AuthError, config::JwtConfig};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of identity token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    /// Fresh per issuance, not tracked anywhere
    pub session_uid: Uuid,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
}

/// Access and refresh token issued together
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token service for JWT operations
///
/// Signs with HS256 using the configured secret. Issuance and decoding hold no
/// mutable state, so one instance is shared across all requests.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_token_duration: config.access_ttl,
            refresh_token_duration: config.refresh_ttl,
        }
    }

    pub fn access_token_duration(&self) -> i64 {
        self.access_token_duration
    }

    pub fn refresh_token_duration(&self) -> i64 {
        self.refresh_token_duration
    }

    /// Generate both access and refresh tokens for a user
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenType::Access, now)?,
            refresh_token: self.issue(user_id, TokenType::Refresh, now)?,
        })
    }

    fn issue(&self, user_id: Uuid, token_type: TokenType, now: i64) -> Result<String, AuthError> {
        let duration = match token_type {
            TokenType::Access => self.access_token_duration,
            TokenType::Refresh => self.refresh_token_duration,
        };

        let claims = Claims {
            user_id,
            session_uid: Uuid::now_v7(),
            token_type,
            iat: now,
            exp: now + duration,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// Every failure collapses into `InvalidToken`; the cause is only logged.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {:?}", e.kind());
                AuthError::InvalidToken
            })
    }

    /// Decode a token and require it to be of the given kind
    pub fn decode_as(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            debug!(
                "Token rejected: expected {} token, got {}",
                expected, claims.token_type
            );
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}
