// Authentication module
// Provides JWT-based pseudonymous login, token refresh, API-key gating and
// request identity resolution

pub mod api_key;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use api_key::{require_api_key, ApiKey, API_KEY_HEADER};
pub use error::AuthError;
pub use handlers::{login_handler, me_handler, refresh_handler};
pub use middleware::{AuthenticatedUser, OptionalUser};
pub use models::{LoginRequest, RefreshRequest, User, UserProfile};
pub use repository::{PgUserRepository, UserStore};
pub use service::AuthService;
pub use token::{Claims, TokenPair, TokenService, TokenType};
