// Database repository for posts and comments

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::posts::{
    error::PostError,
    models::{Comment, CommentRow, Post, PostFilter, PostRow, PostSummary, UpdatePostRequest},
};
use crate::query::{PostQueryBuilder, QueryParam};

/// Foreign key from `comments.post_id` to `posts.id`
const COMMENT_POST_FK: &str = "comments_post_id_fkey";

/// Content storage consumed by the post service.
///
/// Update and delete methods are ownership-scoped: they only touch rows whose
/// id and owner both match, and report how many rows they affected.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Posts matching `filter`, newest first, with comment counts
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostSummary>, PostError>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRow>, PostError>;

    async fn post_exists(&self, post_id: Uuid) -> Result<bool, PostError>;

    /// Comments of a post, newest first
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRow>, PostError>;

    async fn insert_post(&self, post: &Post) -> Result<(), PostError>;

    /// Apply the present fields of `changes` and stamp `updated_at`
    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        changes: &UpdatePostRequest,
        now: DateTime<Utc>,
    ) -> Result<u64, PostError>;

    /// Delete a post together with its comments, atomically.
    /// Nothing is removed unless the post row itself matches.
    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<u64, PostError>;

    /// Fails with `NotFound` when the post no longer exists
    async fn insert_comment(&self, comment: &Comment) -> Result<(), PostError>;

    async fn update_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, PostError>;

    async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> Result<u64, PostError>;
}

/// PostgreSQL-backed content repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepository {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostSummary>, PostError> {
        let (query_str, params) = PostQueryBuilder::from_filter(filter).build();

        let mut query = sqlx::query_as::<_, PostSummary>(&query_str);
        for param in params {
            query = match param {
                QueryParam::Int(value) => query.bind(value),
                QueryParam::Text(value) => query.bind(value),
                QueryParam::Uuid(value) => query.bind(value),
            };
        }

        let posts = query.fetch_all(&self.pool).await?;
        tracing::debug!("Query returned {} posts", posts.len());
        Ok(posts)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRow>, PostError> {
        let post = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id AS post_id, p.community_id, c.name AS community_name,
                   p.author_id, u.username AS author_name, u.profile_image_url AS author_image_url,
                   p.title, p.content, p.created_at, p.updated_at
            FROM posts p
            JOIN communities c ON c.id = p.community_id
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn post_exists(&self, post_id: Uuid) -> Result<bool, PostError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRow>, PostError> {
        let comments = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT cm.id AS comment_id, cm.comment, cm.user_id,
                   u.username, u.profile_image_url AS user_image_url,
                   cm.created_at, cm.updated_at
            FROM comments cm
            JOIN users u ON u.id = cm.user_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at DESC, cm.id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), PostError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, community_id, author_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.id)
        .bind(post.community_id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        changes: &UpdatePostRequest,
        now: DateTime<Utc>,
    ) -> Result<u64, PostError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET community_id = COALESCE($3, community_id),
                title = COALESCE($4, title),
                content = COALESCE($5, content),
                updated_at = $6
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(changes.community_id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<u64, PostError> {
        let mut tx = self.pool.begin().await?;

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(0);
        }

        tx.commit().await?;
        tracing::debug!(
            "Deleted post {} with {} comments",
            post_id,
            comments.rows_affected()
        );
        Ok(deleted)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), PostError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, user_id, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.comment)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The post was deleted after the caller checked for it
            let post_vanished = matches!(
                &e,
                sqlx::Error::Database(db) if db.constraint() == Some(COMMENT_POST_FK)
            );
            if post_vanished {
                PostError::NotFound
            } else {
                PostError::from(e)
            }
        })?;

        Ok(())
    }

    async fn update_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, PostError> {
        let result = sqlx::query(
            "UPDATE comments SET comment = $3, updated_at = $4 WHERE id = $1 AND user_id = $2",
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(text)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> Result<u64, PostError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
