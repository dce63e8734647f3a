use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Read-only reference data grouping posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Community {
    #[schema(example = 2)]
    pub id: i32,
    #[schema(example = "Food")]
    pub name: String,
}
