// Post service - ownership rules for posts and comments

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::posts::{
    error::PostError,
    models::{
        Comment, CommentRequest, CommentView, CreatePostRequest, Post, PostDetail, PostFilter,
        PostSummary, PostView, UpdatePostRequest,
    },
    repository::PostStore,
};

/// True only when a caller is present and is the owner
pub fn is_owner(caller: Option<Uuid>, owner: Uuid) -> bool {
    caller == Some(owner)
}

pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostSummary>, PostError> {
        info!("list_posts: filter={:?}", filter);
        self.store.list_posts(filter).await
    }

    /// Post with its comments, flagged for what `caller` may edit or delete
    pub async fn get_post_detail(
        &self,
        post_id: Uuid,
        caller: Option<Uuid>,
    ) -> Result<PostDetail, PostError> {
        let row = self
            .store
            .find_post(post_id)
            .await?
            .ok_or(PostError::NotFound)?;

        let comments: Vec<CommentView> = self
            .store
            .list_comments(post_id)
            .await?
            .into_iter()
            .map(|c| {
                let owned = is_owner(caller, c.user_id);
                CommentView {
                    comment_id: c.comment_id,
                    comment: c.comment,
                    user_id: c.user_id,
                    username: c.username,
                    user_image_url: c.user_image_url,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                    editable: owned,
                    deletable: owned,
                }
            })
            .collect();

        let owned = is_owner(caller, row.author_id);
        let post = PostView {
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
            editable: owned,
            deletable: owned,
            comment_count: comments.len() as i64,
        };

        Ok(PostDetail { post, comments })
    }

    pub async fn create_post(
        &self,
        request: CreatePostRequest,
        author_id: Uuid,
    ) -> Result<Uuid, PostError> {
        let post = Post {
            id: Uuid::now_v7(),
            community_id: request.community_id,
            author_id,
            title: request.title,
            content: request.content,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.store.insert_post(&post).await?;
        info!("Created post: id={}, author_id={}", post.id, author_id);
        Ok(post.id)
    }

    pub async fn update_post(
        &self,
        post_id: Uuid,
        changes: &UpdatePostRequest,
        caller: Uuid,
    ) -> Result<(), PostError> {
        let affected = self
            .store
            .update_post(post_id, caller, changes, Utc::now())
            .await?;

        if affected == 0 {
            warn!("update_post: no post {} owned by {}", post_id, caller);
            return Err(PostError::UpdateFailed("post"));
        }

        info!("Updated post: id={}", post_id);
        Ok(())
    }

    pub async fn delete_post(&self, post_id: Uuid, caller: Uuid) -> Result<(), PostError> {
        if self.store.delete_post(post_id, caller).await? == 0 {
            warn!("delete_post: no post {} owned by {}", post_id, caller);
            return Err(PostError::DeleteFailed("post"));
        }

        info!("Deleted post: id={}", post_id);
        Ok(())
    }

    pub async fn create_comment(
        &self,
        post_id: Uuid,
        request: CommentRequest,
        user_id: Uuid,
    ) -> Result<Uuid, PostError> {
        if !self.store.post_exists(post_id).await? {
            return Err(PostError::NotFound);
        }

        let comment = Comment {
            id: Uuid::now_v7(),
            post_id,
            user_id,
            comment: request.comment,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.store.insert_comment(&comment).await?;
        info!("Created comment: id={}, post_id={}", comment.id, post_id);
        Ok(comment.id)
    }

    pub async fn update_comment(
        &self,
        comment_id: Uuid,
        text: &str,
        caller: Uuid,
    ) -> Result<(), PostError> {
        let affected = self
            .store
            .update_comment(comment_id, caller, text, Utc::now())
            .await?;

        if affected == 0 {
            warn!("update_comment: no comment {} owned by {}", comment_id, caller);
            return Err(PostError::UpdateFailed("comment"));
        }

        Ok(())
    }

    pub async fn delete_comment(&self, comment_id: Uuid, caller: Uuid) -> Result<(), PostError> {
        if self.store.delete_comment(comment_id, caller).await? == 0 {
            warn!("delete_comment: no comment {} owned by {}", comment_id, caller);
            return Err(PostError::DeleteFailed("comment"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: PostService,
        alice: Uuid,
        bob: Uuid,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        let service = PostService::new(store.clone());
        Fixture { store, service, alice, bob }
    }

    fn new_post(community_id: i32, title: &str) -> CreatePostRequest {
        CreatePostRequest {
            community_id,
            title: title.to_string(),
            content: format!("{} body", title),
        }
    }

    fn comment(text: &str) -> CommentRequest {
        CommentRequest {
            comment: text.to_string(),
        }
    }

    #[test]
    fn test_is_owner() {
        let id = Uuid::now_v7();
        assert!(is_owner(Some(id), id));
        assert!(!is_owner(Some(Uuid::now_v7()), id));
        assert!(!is_owner(None, id));
    }

    #[tokio::test]
    async fn test_detail_flags_follow_caller() {
        let f = fixture();
        let post_id = f.service.create_post(new_post(1, "hello"), f.alice).await.unwrap();
        f.service.create_comment(post_id, comment("mine"), f.alice).await.unwrap();
        f.service.create_comment(post_id, comment("theirs"), f.bob).await.unwrap();

        let as_alice = f.service.get_post_detail(post_id, Some(f.alice)).await.unwrap();
        assert!(as_alice.post.editable && as_alice.post.deletable);
        assert_eq!(as_alice.post.comment_count, 2);
        assert_eq!(as_alice.post.community_name, "History");
        assert_eq!(as_alice.post.author_name, "alice");

        // Newest first
        assert_eq!(as_alice.comments[0].comment, "theirs");
        assert!(!as_alice.comments[0].editable);
        assert!(as_alice.comments[1].editable && as_alice.comments[1].deletable);

        let anonymous = f.service.get_post_detail(post_id, None).await.unwrap();
        assert!(!anonymous.post.editable && !anonymous.post.deletable);
        assert!(anonymous.comments.iter().all(|c| !c.editable && !c.deletable));
    }

    #[tokio::test]
    async fn test_detail_of_missing_post_is_not_found() {
        let f = fixture();
        let result = f.service.get_post_detail(Uuid::now_v7(), Some(f.alice)).await;
        assert!(matches!(result, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_changes_nothing() {
        let f = fixture();
        let post_id = f.service.create_post(new_post(1, "draft"), f.alice).await.unwrap();

        let first = UpdatePostRequest {
            title: Some("final".to_string()),
            ..Default::default()
        };
        f.service.update_post(post_id, &first, f.alice).await.unwrap();

        let second = UpdatePostRequest {
            title: Some("hijacked".to_string()),
            content: Some("spam".to_string()),
            ..Default::default()
        };
        let result = f.service.update_post(post_id, &second, f.bob).await;
        assert!(matches!(result, Err(PostError::UpdateFailed("post"))));

        let detail = f.service.get_post_detail(post_id, None).await.unwrap();
        assert_eq!(detail.post.title, "final");
        assert_eq!(detail.post.content, "draft body");
        assert!(detail.post.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_omitted_fields() {
        let f = fixture();
        let post_id = f.service.create_post(new_post(2, "stew"), f.alice).await.unwrap();

        let changes = UpdatePostRequest {
            community_id: Some(3),
            ..Default::default()
        };
        f.service.update_post(post_id, &changes, f.alice).await.unwrap();

        let detail = f.service.get_post_detail(post_id, None).await.unwrap();
        assert_eq!(detail.post.community_id, 3);
        assert_eq!(detail.post.community_name, "Pets");
        assert_eq!(detail.post.title, "stew");
    }

    #[tokio::test]
    async fn test_update_missing_post_fails_like_non_owner() {
        let f = fixture();
        let result = f
            .service
            .update_post(Uuid::now_v7(), &UpdatePostRequest::default(), f.alice)
            .await;
        assert!(matches!(result, Err(PostError::UpdateFailed("post"))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_keeps_comments() {
        let f = fixture();
        let post_id = f.service.create_post(new_post(1, "keep"), f.alice).await.unwrap();
        f.service.create_comment(post_id, comment("first"), f.bob).await.unwrap();
        f.service.create_comment(post_id, comment("second"), f.alice).await.unwrap();

        let result = f.service.delete_post(post_id, f.bob).await;
        assert!(matches!(result, Err(PostError::DeleteFailed("post"))));
        assert_eq!(f.store.comment_count(post_id), 2);

        f.service.delete_post(post_id, f.alice).await.unwrap();
        assert_eq!(f.store.comment_count(post_id), 0);
        assert!(matches!(
            f.service.get_post_detail(post_id, None).await,
            Err(PostError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_not_found() {
        let f = fixture();
        let result = f
            .service
            .create_comment(Uuid::now_v7(), comment("hello?"), f.alice)
            .await;
        assert!(matches!(result, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn test_store_rejects_comment_for_deleted_post() {
        let f = fixture();
        let post_id = f.service.create_post(new_post(1, "gone"), f.alice).await.unwrap();
        f.service.delete_post(post_id, f.alice).await.unwrap();

        // A post deleted after the existence check
        let late = Comment {
            id: Uuid::now_v7(),
            post_id,
            user_id: f.bob,
            comment: "too late".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let result = f.store.insert_comment(&late).await;
        assert!(matches!(result, Err(PostError::NotFound)));
        assert_eq!(f.store.comment_count(post_id), 0);
    }

    #[tokio::test]
    async fn test_comment_mutations_are_owner_scoped() {
        let f = fixture();
        let post_id = f.service.create_post(new_post(1, "thread"), f.alice).await.unwrap();
        let comment_id = f
            .service
            .create_comment(post_id, comment("original text"), f.bob)
            .await
            .unwrap();

        assert!(matches!(
            f.service.update_comment(comment_id, "edited", f.alice).await,
            Err(PostError::UpdateFailed("comment"))
        ));
        assert!(matches!(
            f.service.delete_comment(comment_id, f.alice).await,
            Err(PostError::DeleteFailed("comment"))
        ));

        f.service.update_comment(comment_id, "edited", f.bob).await.unwrap();
        let detail = f.service.get_post_detail(post_id, Some(f.bob)).await.unwrap();
        assert_eq!(detail.comments[0].comment, "edited");
        assert!(detail.comments[0].updated_at.is_some());

        f.service.delete_comment(comment_id, f.bob).await.unwrap();
        assert_eq!(f.store.comment_count(post_id), 0);
    }

    #[tokio::test]
    async fn test_list_posts_filters() {
        let f = fixture();
        f.service.create_post(new_post(1, "Roman roads"), f.alice).await.unwrap();
        f.service.create_post(new_post(2, "Bread recipe"), f.bob).await.unwrap();
        let newest = f.service.create_post(new_post(2, "Roman bread"), f.alice).await.unwrap();

        let all = f.service.list_posts(&PostFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].post_id, newest);

        let food = PostFilter {
            community_id: Some(2),
            ..Default::default()
        };
        assert_eq!(f.service.list_posts(&food).await.unwrap().len(), 2);

        let roman = PostFilter {
            search: Some("ROMAN".to_string()),
            ..Default::default()
        };
        assert_eq!(f.service.list_posts(&roman).await.unwrap().len(), 2);

        let bobs = PostFilter {
            author_id: Some(f.bob),
            ..Default::default()
        };
        let listed = f.service.list_posts(&bobs).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Bread recipe");
    }
}
