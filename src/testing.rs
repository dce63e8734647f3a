// Test doubles and database fixtures shared by the test modules

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{ApiKey, AuthError, User, UserStore};
use crate::communities::{Community, CommunityStore};
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::posts::{
    Comment, CommentRow, Post, PostError, PostFilter, PostRow, PostStore, PostSummary,
    UpdatePostRequest,
};
use crate::AppState;

pub const TEST_API_KEY: &str = "test-api-key";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing".to_string(),
        access_ttl: 3600,
        refresh_ttl: 86400,
    }
}

/// Router state wired to `store` for every store trait
pub fn test_state(store: Arc<InMemoryStore>) -> AppState {
    AppState::from_stores(
        &test_jwt_config(),
        ApiKey::new(TEST_API_KEY),
        store.clone(),
        store.clone(),
        store,
    )
}

/// Migrated pool for `TEST_DATABASE_URL`.
///
/// Returns `None` when the variable is unset so database tests are skipped
/// on machines without PostgreSQL.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// `prefix` plus a suffix no other test run will produce
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7().simple())
}

#[derive(Default)]
struct Data {
    users: Vec<User>,
    communities: Vec<Community>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

/// In-memory implementation of all store traits.
///
/// One lock guards everything, so each trait call is atomic. Rows are kept
/// in insertion order.
pub struct InMemoryStore {
    data: Mutex<Data>,
    user_queries: AtomicUsize,
}

impl InMemoryStore {
    /// Store seeded with the default communities
    pub fn new() -> Self {
        let communities = ["History", "Food", "Pets", "Health", "Fashion", "Exercise", "Others"]
            .iter()
            .zip(1..)
            .map(|(name, id)| Community {
                id,
                name: name.to_string(),
            })
            .collect();

        Self {
            data: Mutex::new(Data {
                communities,
                ..Default::default()
            }),
            user_queries: AtomicUsize::new(0),
        }
    }

    pub fn add_user(&self, username: &str) -> Uuid {
        let user = User::register(username);
        let id = user.id;
        self.data.lock().unwrap().users.push(user);
        id
    }

    pub fn user_count(&self) -> usize {
        self.data.lock().unwrap().users.len()
    }

    pub fn remove_user(&self, username: &str) {
        self.data
            .lock()
            .unwrap()
            .users
            .retain(|u| !u.username.eq_ignore_ascii_case(username));
    }

    /// Number of `UserStore` calls made so far
    pub fn user_queries(&self) -> usize {
        self.user_queries.load(Ordering::SeqCst)
    }

    pub fn comment_count(&self, post_id: Uuid) -> usize {
        self.data
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .count()
    }

    fn record_user_query(&self) {
        self.user_queries.fetch_add(1, Ordering::SeqCst);
    }
}

impl Data {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn community(&self, id: i32) -> Option<&Community> {
        self.communities.iter().find(|c| c.id == id)
    }

    /// Inner join of a post with its community and author
    fn post_row(&self, post: &Post) -> Option<PostRow> {
        let community = self.community(post.community_id)?;
        let author = self.user(post.author_id)?;
        Some(PostRow {
            post_id: post.id,
            community_id: community.id,
            community_name: community.name.clone(),
            author_id: author.id,
            author_name: author.username.clone(),
            author_image_url: author.profile_image_url.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }
}

/// Newest first; among equal timestamps the later insertion wins
fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.reverse();
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    rows
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.record_user_query();
        let needle = username.to_lowercase();
        Ok(self
            .data
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username.to_lowercase() == needle)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        self.record_user_query();
        Ok(self.data.lock().unwrap().user(id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<bool, AuthError> {
        self.record_user_query();
        let mut data = self.data.lock().unwrap();
        let needle = user.username.to_lowercase();
        if data.users.iter().any(|u| u.username.to_lowercase() == needle) {
            return Ok(false);
        }
        data.users.push(user.clone());
        Ok(true)
    }
}

#[async_trait]
impl CommunityStore for InMemoryStore {
    async fn list_communities(&self) -> Result<Vec<Community>, ApiError> {
        let mut communities = self.data.lock().unwrap().communities.clone();
        communities.sort_by_key(|c| c.id);
        Ok(communities)
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostSummary>, PostError> {
        let data = self.data.lock().unwrap();
        let search = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let rows: Vec<PostSummary> = data
            .posts
            .iter()
            .filter(|p| filter.community_id.map_or(true, |id| p.community_id == id))
            .filter(|p| filter.author_id.map_or(true, |id| p.author_id == id))
            .filter(|p| {
                search
                    .as_deref()
                    .map_or(true, |term| p.title.to_lowercase().contains(term))
            })
            .filter_map(|p| {
                let row = data.post_row(p)?;
                let comment_count =
                    data.comments.iter().filter(|c| c.post_id == p.id).count() as i64;
                Some(PostSummary {
                    post_id: row.post_id,
                    community_id: row.community_id,
                    community_name: row.community_name,
                    author_id: row.author_id,
                    author_name: row.author_name,
                    author_image_url: row.author_image_url,
                    title: row.title,
                    content: row.content,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    comment_count,
                })
            })
            .collect();

        Ok(newest_first(rows, |r| r.created_at))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRow>, PostError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .and_then(|p| data.post_row(p)))
    }

    async fn post_exists(&self, post_id: Uuid) -> Result<bool, PostError> {
        Ok(self.data.lock().unwrap().posts.iter().any(|p| p.id == post_id))
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRow>, PostError> {
        let data = self.data.lock().unwrap();
        let rows: Vec<CommentRow> = data
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let user = data.user(c.user_id)?;
                Some(CommentRow {
                    comment_id: c.id,
                    comment: c.comment.clone(),
                    user_id: user.id,
                    username: user.username.clone(),
                    user_image_url: user.profile_image_url.clone(),
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                })
            })
            .collect();

        Ok(newest_first(rows, |r| r.created_at))
    }

    async fn insert_post(&self, post: &Post) -> Result<(), PostError> {
        self.data.lock().unwrap().posts.push(post.clone());
        Ok(())
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        changes: &UpdatePostRequest,
        now: DateTime<Utc>,
    ) -> Result<u64, PostError> {
        let mut data = self.data.lock().unwrap();
        let Some(post) = data
            .posts
            .iter_mut()
            .find(|p| p.id == post_id && p.author_id == author_id)
        else {
            return Ok(0);
        };

        if let Some(community_id) = changes.community_id {
            post.community_id = community_id;
        }
        if let Some(title) = &changes.title {
            post.title = title.clone();
        }
        if let Some(content) = &changes.content {
            post.content = content.clone();
        }
        post.updated_at = Some(now);
        Ok(1)
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<u64, PostError> {
        let mut data = self.data.lock().unwrap();
        let before = data.posts.len();
        data.posts
            .retain(|p| !(p.id == post_id && p.author_id == author_id));
        if data.posts.len() == before {
            return Ok(0);
        }

        data.comments.retain(|c| c.post_id != post_id);
        Ok(1)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), PostError> {
        let mut data = self.data.lock().unwrap();
        if !data.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(PostError::NotFound);
        }
        data.comments.push(comment.clone());
        Ok(())
    }

    async fn update_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, PostError> {
        let mut data = self.data.lock().unwrap();
        match data
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id && c.user_id == user_id)
        {
            Some(comment) => {
                comment.comment = text.to_string();
                comment.updated_at = Some(now);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> Result<u64, PostError> {
        let mut data = self.data.lock().unwrap();
        let before = data.comments.len();
        data.comments
            .retain(|c| !(c.id == comment_id && c.user_id == user_id));
        Ok((before - data.comments.len()) as u64)
    }
}
