use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::password::PasswordHasher;
use super::token::TokenConfig;
use super::validate;
use crate::shared::{AppError, AppState};
use crate::user::models::{TokenAccess, TokenEntry, UserModel};
use crate::user::repository::UserRepository;

/// Service for the register/login/authenticate/logout business logic
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
    password_hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            token_config,
            password_hasher,
        }
    }

    /// Builds a service over the dependencies injected into app state
    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.user_repository),
            state.token_config.clone(),
            state.password_hasher.clone(),
        )
    }

    /// Registers a new user and returns it with its first session token
    ///
    /// The token is part of the inserted document, so the uniqueness check
    /// and the first session are committed in one store call.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserModel, String), AppError> {
        let email = validate::normalize_email(email);
        validate::validate_email(&email)?;
        validate::validate_password(password)?;

        let password_hash = self.password_hasher.hash(password)?;
        let mut user = UserModel::new(email, password_hash);
        let token = self.token_config.issue_token(&user.id, TokenAccess::Auth)?;
        user.tokens.push(TokenEntry {
            access: TokenAccess::Auth,
            token: token.clone(),
        });

        self.repository.insert_user(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok((user, token))
    }

    /// Verifies credentials and appends a fresh session token
    ///
    /// Unknown email and wrong password produce the identical error, keeping
    /// the endpoint useless for probing which emails exist.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserModel, String), AppError> {
        let email = validate::normalize_email(email);

        let Some(mut user) = self.repository.find_by_email(&email).await? else {
            debug!("Login attempt for unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !self
            .password_hasher
            .verify(password, &user.password_hash)?
        {
            debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.token_config.issue_token(&user.id, TokenAccess::Auth)?;
        let entry = TokenEntry {
            access: TokenAccess::Auth,
            token: token.clone(),
        };
        self.repository.append_token(&user.id, &entry).await?;
        user.tokens.push(entry);

        info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }

    /// Resolves a token to its user
    ///
    /// The signature must verify AND the exact token string must still be in
    /// the user's stored token list; logout removes the entry, which is what
    /// revokes the token.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<UserModel, AppError> {
        let claims = self.token_config.validate_token(token)?;

        let Some(user) = self.repository.find_by_id(&claims.user_id).await? else {
            warn!(user_id = %claims.user_id, "Token signature is valid but the user does not exist");
            return Err(AppError::Unauthorized);
        };

        if !user.has_token(token, claims.access) {
            warn!(user_id = %user.id, "Token not in the user's token list, treating as revoked");
            return Err(AppError::Unauthorized);
        }

        debug!(user_id = %user.id, "Token authenticated");
        Ok(user)
    }

    /// Removes the presented token from the user's list, ending that session
    ///
    /// Sibling entries for the user's other sessions stay in place. A token
    /// that is already gone fails with `Unauthorized` rather than silently
    /// succeeding.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        let removed = self.repository.remove_token(user_id, token).await?;
        if !removed {
            warn!(user_id = %user_id, "Token was already removed at logout");
            return Err(AppError::Unauthorized);
        }

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}
