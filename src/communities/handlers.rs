// HTTP handlers for community endpoints

use axum::{extract::State, Json};

use crate::communities::Community;
use crate::error::ApiError;
use crate::AppState;

/// List all communities
/// GET /community
#[utoipa::path(
    get,
    path = "/community",
    responses(
        (status = 200, description = "All communities", body = Vec<Community>),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "community"
)]
pub async fn list_communities_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Community>>, ApiError> {
    tracing::debug!("Fetching all communities");

    let communities = state.communities.list_communities().await?;

    tracing::debug!("Retrieved {} communities", communities.len());
    Ok(Json(communities))
}
