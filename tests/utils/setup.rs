use std::sync::Arc;

use axum::Router;
use user_api::{
    app,
    auth::password::PasswordHasher,
    auth::token::TokenConfig,
    user::{InMemoryUserRepository, TokenAccess, TokenEntry, UserModel, UserRepository},
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";

/// A user seeded directly into the store, with one live session token
pub struct SeededUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

pub struct TestSetup {
    pub app: Router,
    pub repository: Arc<InMemoryUserRepository>,
    pub users: Vec<SeededUser>,
}

impl TestSetup {
    /// Reads a user back from the store, bypassing the API
    pub async fn stored_user(&self, email: &str) -> Option<UserModel> {
        self.repository.find_by_email(email).await.unwrap()
    }
}

pub struct TestSetupBuilder {
    seeded: Vec<(String, String)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { seeded: vec![] }
    }

    pub fn with_seeded_user(mut self, email: &str, password: &str) -> Self {
        self.seeded.push((email.to_string(), password.to_string()));
        self
    }

    pub fn with_two_seeded_users(self) -> Self {
        self.with_seeded_user("person.one@example.com", "OnePass123!")
            .with_seeded_user("person.two@example.com", "TwoPass456!")
    }

    pub fn build(self) -> TestSetup {
        let token_config = TokenConfig::with_secret(TEST_SECRET);
        let password_hasher = PasswordHasher::new();

        // Seed users the way register stores them: hashed password plus
        // one auth token already in the list
        let mut users = Vec::new();
        let mut models = Vec::new();
        for (email, password) in self.seeded {
            let password_hash = password_hasher.hash(&password).unwrap();
            let mut model = UserModel::new(email.clone(), password_hash);
            let token = token_config
                .issue_token(&model.id, TokenAccess::Auth)
                .unwrap();
            model.tokens.push(TokenEntry {
                access: TokenAccess::Auth,
                token: token.clone(),
            });

            users.push(SeededUser {
                id: model.id.clone(),
                email,
                password,
                token,
            });
            models.push(model);
        }

        let repository = Arc::new(InMemoryUserRepository::with_users(models));
        let state = AppState::new(repository.clone(), token_config, password_hasher);

        TestSetup {
            app: app(state),
            repository,
            users,
        }
    }
}
