use async_trait::async_trait;
use sqlx::PgPool;

use crate::communities::Community;
use crate::error::ApiError;

/// Community storage
#[async_trait]
pub trait CommunityStore: Send + Sync {
    /// All communities ordered by id
    async fn list_communities(&self) -> Result<Vec<Community>, ApiError>;
}

/// PostgreSQL-backed community repository
#[derive(Clone)]
pub struct PgCommunityRepository {
    pool: PgPool,
}

impl PgCommunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommunityStore for PgCommunityRepository {
    async fn list_communities(&self) -> Result<Vec<Community>, ApiError> {
        let communities =
            sqlx::query_as::<_, Community>("SELECT id, name FROM communities ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(communities)
    }
}
