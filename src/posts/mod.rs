// Posts module
// Ownership-scoped CRUD for posts and their comments

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::PostError;
pub use handlers::*;
pub use models::*;
pub use repository::{PgPostRepository, PostStore};
pub use service::PostService;
