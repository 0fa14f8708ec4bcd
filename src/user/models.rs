use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tag distinguishing what a stored token grants
///
/// Only `Auth` is issued today, but the tag travels in both the JWT claims
/// and the stored entry so the two can be cross-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenAccess {
    Auth,
}

impl fmt::Display for TokenAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TokenAccess::Auth => "auth",
            }
        )
    }
}

/// One issued token as stored on the user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub access: TokenAccess,
    pub token: String,
}

/// Database model for a stored user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserModel {
    pub id: String,            // UUID v4 as string
    pub email: String,         // unique, stored lowercase
    pub password_hash: String, // PHC string, never the plaintext
    pub tokens: Vec<TokenEntry>, // ordered; appended on login, pruned on logout
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new user model with a generated ID and an empty token list
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            tokens: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Checks whether the exact token string, with a matching access tag, is
    /// currently in the user's token list
    pub fn has_token(&self, token: &str, access: TokenAccess) -> bool {
        self.tokens
            .iter()
            .any(|entry| entry.access == access && entry.token == token)
    }
}
