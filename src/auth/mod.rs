// Public API - what other modules can use
pub use handlers::{login, logout, me, register};
pub use middleware::require_auth;
pub use types::{AuthClaims, AuthenticatedUser, X_AUTH_HEADER};

// Internal modules
mod handlers;
mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod types;
mod validate;
