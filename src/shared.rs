use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenConfig;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub password_hasher: PasswordHasher,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            user_repository,
            token_config,
            password_hasher,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("email already in use")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Some(json!({ "error": message, "field": field })),
            ),
            AppError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                Some(json!({ "error": "email already in use" })),
            ),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Some(json!({ "error": "invalid credentials" })),
            ),
            // Token failures get an empty body
            AppError::InvalidToken | AppError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Request failed on the user store");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some(json!({ "error": "internal server error" })),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(json!({ "error": msg }))),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(json!({ "error": "internal server error" })),
            ),
        };

        match body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::user::models::{TokenEntry, UserModel};
    use async_trait::async_trait;

    /// Dummy user repository that does nothing - for tests that don't care about storage
    pub struct DummyUserRepository;

    #[async_trait]
    impl UserRepository for DummyUserRepository {
        async fn insert_user(&self, _user: &UserModel) -> Result<(), AppError> {
            Ok(())
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<UserModel>, AppError> {
            Ok(None)
        }
        async fn find_by_id(&self, _user_id: &str) -> Result<Option<UserModel>, AppError> {
            Ok(None)
        }
        async fn append_token(&self, _user_id: &str, _entry: &TokenEntry) -> Result<(), AppError> {
            Ok(())
        }
        async fn remove_token(&self, _user_id: &str, _token: &str) -> Result<bool, AppError> {
            Ok(false)
        }
        async fn delete_user(&self, _user_id: &str) -> Result<bool, AppError> {
            Ok(false)
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        token_config: Option<TokenConfig>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                token_config: None,
            }
        }

        pub fn with_user_repository(
            mut self,
            repo: Arc<dyn UserRepository + Send + Sync>,
        ) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_token_config(mut self, token_config: TokenConfig) -> Self {
            self.token_config = Some(token_config);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                user_repository: self
                    .user_repository
                    .unwrap_or_else(|| Arc::new(DummyUserRepository)),
                token_config: self
                    .token_config
                    .unwrap_or_else(|| TokenConfig::with_secret("test-secret")),
                password_hasher: PasswordHasher::new(),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
