// Library crate for the user API server
// This file exposes the public API for integration tests

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use auth::{AuthenticatedUser, X_AUTH_HEADER};
pub use shared::{AppError, AppState};
pub use user::{InMemoryUserRepository, TokenAccess, TokenEntry, UserModel, UserRepository};

/// Builds the application router over the given state
///
/// Browsers can only read the x-auth response header if CORS exposes it,
/// so the CORS layer names it in both directions.
pub fn app(state: AppState) -> Router {
    let x_auth = HeaderName::from_static(X_AUTH_HEADER);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, x_auth.clone()])
        .expose_headers([x_auth]);

    let protected = Router::new()
        .route("/users/me", get(auth::me))
        .route("/users/me/token", delete(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/users", post(auth::register))
        .route("/users/login", post(auth::login))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe
async fn health() -> &'static str {
    "OK"
}
