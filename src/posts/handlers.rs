// HTTP handlers for posts and comments

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, OptionalUser};
use crate::posts::{
    error::PostError,
    models::{
        CommentCreated, CommentRequest, CreatePostRequest, ListPostsQuery, PostCreated,
        PostDetail, PostFilter, PostSummary, UpdatePostRequest,
    },
};
use crate::AppState;

/// List posts
/// GET /post
#[utoipa::path(
    get,
    path = "/post",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts, newest first", body = [PostSummary]),
        (status = 500, description = "Database error", body = crate::error::ErrorResponse)
    ),
    security((), ("bearer" = [])),
    tag = "post"
)]
pub async fn list_posts_handler(
    State(state): State<AppState>,
    caller: OptionalUser,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<PostSummary>>, PostError> {
    let mut filter = PostFilter {
        community_id: query.community_id,
        search: query.search,
        author_id: None,
    };

    if query.mine.unwrap_or(false) {
        match caller.user_id() {
            Some(user_id) => filter.author_id = Some(user_id),
            // Nobody to match against
            None => return Ok(Json(Vec::new())),
        }
    }

    let posts = state.post_service.list_posts(&filter).await?;
    Ok(Json(posts))
}

/// Get a post with its comments
/// GET /post/{postId}
#[utoipa::path(
    get,
    path = "/post/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post detail", body = PostDetail),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    ),
    security((), ("bearer" = [])),
    tag = "post"
)]
pub async fn get_post_handler(
    State(state): State<AppState>,
    caller: OptionalUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostDetail>, PostError> {
    let detail = state
        .post_service
        .get_post_detail(post_id, caller.user_id())
        .await?;
    Ok(Json(detail))
}

/// Create a post
/// POST /post
#[utoipa::path(
    post,
    path = "/post",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = PostCreated),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "post"
)]
pub async fn create_post_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<PostCreated>, PostError> {
    request.validate()?;

    let post_id = state.post_service.create_post(request, user.user_id).await?;
    Ok(Json(PostCreated { post_id }))
}

/// Update own post
/// PATCH /post/{postId}
#[utoipa::path(
    patch,
    path = "/post/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 204, description = "Post updated"),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 500, description = "No such post owned by the caller", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "post"
)]
pub async fn update_post_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<StatusCode, PostError> {
    request.validate()?;

    state
        .post_service
        .update_post(post_id, &request, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete own post and its comments
/// DELETE /post/{postId}
#[utoipa::path(
    delete,
    path = "/post/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 500, description = "No such post owned by the caller", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "post"
)]
pub async fn delete_post_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, PostError> {
    state.post_service.delete_post(post_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Comment on a post
/// POST /post/{postId}/comment
#[utoipa::path(
    post,
    path = "/post/{postId}/comment",
    params(("postId" = Uuid, Path, description = "Post ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentCreated),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "comment"
)]
pub async fn create_comment_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentCreated>, PostError> {
    request.validate()?;

    let comment_id = state
        .post_service
        .create_comment(post_id, request, user.user_id)
        .await?;
    Ok(Json(CommentCreated { comment_id }))
}

/// Edit own comment
/// PATCH /post/{postId}/comment/{commentId}
#[utoipa::path(
    patch,
    path = "/post/{postId}/comment/{commentId}",
    params(
        ("postId" = Uuid, Path, description = "Post ID"),
        ("commentId" = Uuid, Path, description = "Comment ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 204, description = "Comment updated"),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 500, description = "No such comment owned by the caller", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "comment"
)]
pub async fn update_comment_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((_post_id, comment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CommentRequest>,
) -> Result<StatusCode, PostError> {
    request.validate()?;

    state
        .post_service
        .update_comment(comment_id, &request.comment, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete own comment
/// DELETE /post/{postId}/comment/{commentId}
#[utoipa::path(
    delete,
    path = "/post/{postId}/comment/{commentId}",
    params(
        ("postId" = Uuid, Path, description = "Post ID"),
        ("commentId" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 500, description = "No such comment owned by the caller", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "comment"
)]
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((_post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, PostError> {
    state
        .post_service
        .delete_comment(comment_id, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
