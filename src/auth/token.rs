use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::AuthClaims;
use crate::shared::AppError;
use crate::user::models::TokenAccess;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
}

impl TokenConfig {
    /// Reads the signing secret from the environment; meant to be called once
    /// at process start
    pub fn new() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
        }
    }

    /// Builds a config with an explicit secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs a token binding the user id to an access tag
    ///
    /// Tokens carry no timestamps, so the same inputs always produce the same
    /// token string; revocation happens through the stored token list, not
    /// through expiry.
    #[instrument(skip(self, user_id))]
    pub fn issue_token(&self, user_id: &str, access: TokenAccess) -> Result<String, AppError> {
        let claims = AuthClaims {
            user_id: user_id.to_string(),
            access,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::Internal
        })
    }

    /// Verifies the signature and decodes the claims
    ///
    /// Signature validity alone does not make a token good; callers must also
    /// check membership in the user's stored token list.
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<AuthClaims, AppError> {
        debug!("Decoding and validating JWT token");

        // These tokens have no exp claim, so it must not be required
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| {
            debug!(
                user_id = %data.claims.user_id,
                access = %data.claims.access,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::InvalidToken
        })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}
