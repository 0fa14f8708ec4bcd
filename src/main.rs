use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_api::auth::password::PasswordHasher;
use user_api::auth::token::TokenConfig;
use user_api::user::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
use user_api::{app, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting user API server");

    let token_config = TokenConfig::new();
    let password_hasher = PasswordHasher::new();

    // Create shared application state with dependency injection
    let user_repository: Arc<dyn UserRepository + Send + Sync> =
        match std::env::var("DATABASE_URL") {
            Ok(database_url) => {
                let pool = PgPool::connect(&database_url)
                    .await
                    .expect("Failed to connect to database");
                let repository = PostgresUserRepository::new(pool);
                repository
                    .ensure_schema()
                    .await
                    .expect("Failed to prepare users schema");
                info!("Using PostgreSQL user store");
                Arc::new(repository)
            }
            Err(_) => {
                warn!("DATABASE_URL not set, using in-memory user store");
                Arc::new(InMemoryUserRepository::new())
            }
        };

    let app_state = AppState::new(user_repository, token_config, password_hasher);
    let app = app(app_state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();
    info!("Server running on http://localhost:{}", port);
    axum::serve(listener, app).await.unwrap();
}
