// Database repository for users

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{error::AuthError, models::User};

/// User storage consumed by the auth service
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by username, ignoring case
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    /// Insert a user. Returns `false` without inserting when the username is
    /// already taken (case-insensitively), e.g. by a concurrent login.
    async fn insert_user(&self, user: &User) -> Result<bool, AuthError>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, profile_image_url, created_at FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, profile_image_url, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<bool, AuthError> {
        // The unique index on LOWER(username) turns a lost race into a no-op
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, profile_image_url, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.profile_image_url)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
