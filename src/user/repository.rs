use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{TokenEntry, UserModel};
use crate::shared::AppError;

/// Trait for credential store operations
///
/// `insert_user` rejects an email that is already present with
/// `DuplicateEmail`. `remove_token` and `delete_user` report whether anything
/// was removed; a miss is not an error. Every mutation must be atomic per
/// user document: two concurrent logins for the same user may not lose
/// either token append.
#[async_trait]
pub trait UserRepository {
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn append_token(&self, user_id: &str, entry: &TokenEntry) -> Result<(), AppError>;
    async fn remove_token(&self, user_id: &str, token: &str) -> Result<bool, AppError>;
    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts. Every operation runs
/// under a single lock acquisition, which is what makes it atomic per user.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let mut user_map = HashMap::new();
        for user in users {
            user_map.insert(user.id.clone(), user);
        }

        Self {
            users: Mutex::new(user_map),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Checks if a user exists by ID (useful for debugging)
    pub fn has_user(&self, user_id: &str) -> bool {
        self.users.lock().unwrap().contains_key(user_id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, email = %user.email, "Inserting user into memory");

        let mut users = self.users.lock().unwrap();
        if users.values().any(|existing| existing.email == user.email) {
            debug!(email = %user.email, "Email already registered in memory");
            return Err(AppError::DuplicateEmail);
        }
        if users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User id already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());

        debug!(user_id = %user.id, "User inserted successfully into memory");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!("Fetching user by email from memory");

        let users = self.users.lock().unwrap();
        let user = users
            .values()
            .find(|existing| existing.email == email)
            .cloned();

        match &user {
            Some(u) => debug!(user_id = %u.id, "User found in memory"),
            None => debug!("User not found in memory"),
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user by id from memory");

        let users = self.users.lock().unwrap();
        Ok(users.get(user_id).cloned())
    }

    #[instrument(skip(self, entry))]
    async fn append_token(&self, user_id: &str, entry: &TokenEntry) -> Result<(), AppError> {
        debug!(user_id = %user_id, "Appending token in memory");

        let mut users = self.users.lock().unwrap();
        match users.get_mut(user_id) {
            Some(user) => {
                user.tokens.push(entry.clone());
                debug!(user_id = %user_id, token_count = user.tokens.len(), "Token appended in memory");
                Ok(())
            }
            None => {
                warn!(user_id = %user_id, "User not found for token append in memory");
                Err(AppError::NotFound("User not found".to_string()))
            }
        }
    }

    #[instrument(skip(self, token))]
    async fn remove_token(&self, user_id: &str, token: &str) -> Result<bool, AppError> {
        debug!(user_id = %user_id, "Removing token in memory");

        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(user_id) else {
            debug!(user_id = %user_id, "User not found for token removal in memory");
            return Ok(false);
        };

        // Only the first matching entry goes; duplicates cost one removal each
        match user.tokens.iter().position(|entry| entry.token == token) {
            Some(index) => {
                user.tokens.remove(index);
                debug!(user_id = %user_id, token_count = user.tokens.len(), "Token removed in memory");
                Ok(true)
            }
            None => {
                debug!(user_id = %user_id, "Token not present in memory");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError> {
        debug!(user_id = %user_id, "Deleting user from memory");

        let mut users = self.users.lock().unwrap();
        Ok(users.remove(user_id).is_some())
    }
}

/// PostgreSQL implementation of the credential store
///
/// User documents live in a single `users` table with the token list as a
/// JSONB array column, so every list mutation is a single statement and
/// therefore atomic per row.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the users table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                tokens JSONB NOT NULL DEFAULT '[]'::jsonb,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to ensure users schema");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, email = %user.email, "Inserting user into database");

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, tokens, created_at) VALUES ($1, $2, $3, $4, $5)"
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Json(&user.tokens))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    debug!(email = %user.email, "Email already registered in database");
                    return AppError::DuplicateEmail;
                }
            }
            warn!(error = %e, "Failed to insert user into database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user.id, "User inserted successfully into database");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!("Fetching user by email from database");

        let row = sqlx::query(
            "SELECT id, email, password_hash, tokens, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let user = match row {
            Some(row) => {
                let tokens: Json<Vec<TokenEntry>> = row.get("tokens");
                let user = UserModel {
                    id: row.get("id"),
                    email: row.get("email"),
                    password_hash: row.get("password_hash"),
                    tokens: tokens.0,
                    created_at: row.get("created_at"),
                };
                debug!(user_id = %user.id, "User found in database");
                Some(user)
            }
            None => {
                debug!("User not found in database");
                None
            }
        };

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user by id from database");

        let row = sqlx::query(
            "SELECT id, email, password_hash, tokens, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to fetch user by id from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let user = match row {
            Some(row) => {
                let tokens: Json<Vec<TokenEntry>> = row.get("tokens");
                Some(UserModel {
                    id: row.get("id"),
                    email: row.get("email"),
                    password_hash: row.get("password_hash"),
                    tokens: tokens.0,
                    created_at: row.get("created_at"),
                })
            }
            None => {
                debug!(user_id = %user_id, "User not found in database");
                None
            }
        };

        Ok(user)
    }

    #[instrument(skip(self, entry))]
    async fn append_token(&self, user_id: &str, entry: &TokenEntry) -> Result<(), AppError> {
        debug!(user_id = %user_id, "Appending token in database");

        // Single-statement concat keeps concurrent appends from losing entries
        let result = sqlx::query("UPDATE users SET tokens = tokens || $2 WHERE id = $1")
            .bind(user_id)
            .bind(Json(entry))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to append token in database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user_id, "User not found for token append");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!(user_id = %user_id, "Token appended successfully in database");
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn remove_token(&self, user_id: &str, token: &str) -> Result<bool, AppError> {
        debug!(user_id = %user_id, "Removing token in database");

        // Drops only the first entry whose token matches; the EXISTS guard
        // keeps the statement a no-op when nothing matches
        let result = sqlx::query(
            "UPDATE users
                SET tokens = tokens - (
                    SELECT (t.ord - 1)::int
                      FROM jsonb_array_elements(tokens) WITH ORDINALITY AS t(entry, ord)
                     WHERE t.entry->>'token' = $2
                     ORDER BY t.ord
                     LIMIT 1
                )
              WHERE id = $1
                AND EXISTS (
                    SELECT 1
                      FROM jsonb_array_elements(tokens) AS e(entry)
                     WHERE e.entry->>'token' = $2
                )",
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to remove token in database");
            AppError::DatabaseError(e.to_string())
        })?;

        let removed = result.rows_affected() > 0;
        debug!(user_id = %user_id, removed, "Token removal finished in database");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError> {
        debug!(user_id = %user_id, "Deleting user from database");

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to delete user from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
