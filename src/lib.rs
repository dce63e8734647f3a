//! Community forum backend: pseudonymous login, communities, and
//! ownership-scoped posts and comments over PostgreSQL.

pub mod auth;
pub mod communities;
pub mod config;
pub mod db;
pub mod error;
pub mod posts;
pub mod query;
pub mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    require_api_key, ApiKey, AuthService, PgUserRepository, TokenService, UserStore,
};
use communities::{CommunityStore, PgCommunityRepository};
use config::{Config, JwtConfig};
use posts::{PgPostRepository, PostService, PostStore};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::me_handler,
        communities::handlers::list_communities_handler,
        posts::handlers::list_posts_handler,
        posts::handlers::get_post_handler,
        posts::handlers::create_post_handler,
        posts::handlers::update_post_handler,
        posts::handlers::delete_post_handler,
        posts::handlers::create_comment_handler,
        posts::handlers::update_comment_handler,
        posts::handlers::delete_comment_handler,
    ),
    components(schemas(
        auth::models::LoginRequest,
        auth::models::RefreshRequest,
        auth::models::UserProfile,
        auth::token::TokenPair,
        communities::models::Community,
        posts::models::PostSummary,
        posts::models::PostView,
        posts::models::CommentView,
        posts::models::PostDetail,
        posts::models::CreatePostRequest,
        posts::models::UpdatePostRequest,
        posts::models::CommentRequest,
        posts::models::PostCreated,
        posts::models::CommentCreated,
        error::ErrorResponse,
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "auth", description = "Login and token refresh"),
        (name = "user", description = "Current user profile"),
        (name = "community", description = "Community reference data"),
        (name = "post", description = "Posts"),
        (name = "comment", description = "Comments on posts")
    ),
    info(
        title = "Forum API",
        version = "1.0.0",
        description = "Community forum backend with pseudonymous login"
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
    pub communities: Arc<dyn CommunityStore>,
    pub api_key: ApiKey,
}

impl AppState {
    /// State backed by the PostgreSQL repositories
    pub fn new(config: &Config, pool: PgPool) -> Self {
        Self::from_stores(
            &config.jwt,
            ApiKey::new(config.api_key.as_str()),
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgPostRepository::new(pool.clone())),
            Arc::new(PgCommunityRepository::new(pool)),
        )
    }

    pub fn from_stores(
        jwt: &JwtConfig,
        api_key: ApiKey,
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        communities: Arc<dyn CommunityStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(jwt));
        Self {
            auth_service: Arc::new(AuthService::new(users, tokens.clone())),
            post_service: Arc::new(PostService::new(posts)),
            tokens,
            communities,
            api_key,
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    // Only login sits behind the API key
    let login = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route_layer(middleware::from_fn_with_state(
            state.api_key.clone(),
            require_api_key,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(login)
        .route("/auth/token/refresh", post(auth::refresh_handler))
        .route("/user", get(auth::me_handler))
        .route("/community", get(communities::list_communities_handler))
        .route(
            "/post",
            get(posts::list_posts_handler).post(posts::create_post_handler),
        )
        .route(
            "/post/:postId",
            get(posts::get_post_handler)
                .patch(posts::update_post_handler)
                .delete(posts::delete_post_handler),
        )
        .route("/post/:postId/comment", post(posts::create_comment_handler))
        .route(
            "/post/:postId/comment/:commentId",
            patch(posts::update_comment_handler).delete(posts::delete_comment_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
