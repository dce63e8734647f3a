use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Domain model representing a post in the database
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub community_id: i32,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Domain model representing a comment in the database
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filters applied when listing posts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub community_id: Option<i32>,
    /// Case-insensitive title substring
    pub search: Option<String>,
    /// Restrict to one author's posts
    pub author_id: Option<Uuid>,
}

/// Post joined with its community and author, as listed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub post_id: Uuid,
    pub community_id: i32,
    pub community_name: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_image_url: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub comment_count: i64,
}

/// Post joined with its community and author, as stored
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub post_id: Uuid,
    pub community_id: i32,
    pub community_name: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_image_url: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Comment joined with its author, as stored
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub comment_id: Uuid,
    pub comment: String,
    pub user_id: Uuid,
    pub username: String,
    pub user_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Post as shown on the detail page, with ownership flags for the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub post_id: Uuid,
    pub community_id: i32,
    pub community_name: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_image_url: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub editable: bool,
    pub deletable: bool,
    pub comment_count: i64,
}

/// Comment as shown on the detail page, with ownership flags for the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub comment_id: Uuid,
    pub comment: String,
    pub user_id: Uuid,
    pub username: String,
    pub user_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub editable: bool,
    pub deletable: bool,
}

/// Response for GET /post/{postId}
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Query string for GET /post
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// Only posts of this community; an empty value means all communities
    #[serde(default, deserialize_with = "empty_as_none")]
    pub community_id: Option<i32>,
    /// Case-insensitive title substring
    pub search: Option<String>,
    /// Only the caller's own posts
    pub mine: Option<bool>,
}

/// `?communityId=` parses as no filter instead of a bad request
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Request DTO for creating a post
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(range(min = 1, message = "communityId must be positive"))]
    #[schema(example = 2)]
    pub community_id: i32,
    #[validate(
        length(max = 200, message = "title must not exceed 200 characters"),
        custom(function = "crate::validation::validate_not_blank", message = "title is required")
    )]
    pub title: String,
    #[validate(custom(function = "crate::validation::validate_not_blank", message = "content is required"))]
    pub content: String,
}

/// Request DTO for updating a post; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(range(min = 1, message = "communityId must be positive"))]
    pub community_id: Option<i32>,
    #[validate(
        length(max = 200, message = "title must not exceed 200 characters"),
        custom(function = "crate::validation::validate_not_blank", message = "title must not be blank")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "crate::validation::validate_not_blank", message = "content must not be blank"))]
    pub content: Option<String>,
}

/// Request DTO for creating or updating a comment
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CommentRequest {
    #[validate(
        length(max = 2000, message = "comment must not exceed 2000 characters"),
        custom(function = "crate::validation::validate_not_blank", message = "comment is required")
    )]
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostCreated {
    pub post_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreated {
    pub comment_id: Uuid,
}
