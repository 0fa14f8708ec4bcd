use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use tracing::{instrument, warn};

use crate::shared::AppError;

/// Argon2id password hasher
///
/// Hashes carry their own salt and parameters in PHC string form, so
/// verification needs nothing beyond the stored string.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hashes a password with a fresh random salt
    ///
    /// The same plaintext yields a different PHC string each call.
    #[instrument(skip(self, password))]
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                warn!(error = %e, "Password hashing failed");
                AppError::Internal
            })?;

        Ok(hash.to_string())
    }

    /// Verifies a password against a stored PHC string
    ///
    /// A mismatched password is `Ok(false)`; only a malformed stored hash or
    /// a crypto failure is an error.
    #[instrument(skip(self, password, hash))]
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            warn!(error = %e, "Stored password hash failed to parse");
            AppError::Internal
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                warn!(error = %e, "Password verification failed unexpectedly");
                Err(AppError::Internal)
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
