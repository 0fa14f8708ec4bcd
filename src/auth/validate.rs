use once_cell::sync::Lazy;
use regex::Regex;

use crate::shared::AppError;

/// Minimum accepted password length; there are no character-class rules
pub const MIN_PASSWORD_LENGTH: usize = 8;

// Practical RFC 5322 subset; requires at least one dot after the @
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .unwrap()
});

/// Normalizes an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an already-normalized email address
pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() || email.len() > 255 {
        return Err(AppError::Validation {
            field: "email",
            message: "email must be between 1 and 255 characters".to_string(),
        });
    }

    if email.contains("..") {
        return Err(AppError::Validation {
            field: "email",
            message: "email must not contain consecutive dots".to_string(),
        });
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::Validation {
            field: "email",
            message: "invalid email format".to_string(),
        });
    }

    Ok(())
}

/// Validates a candidate password against the length policy
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation {
            field: "password",
            message: format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ),
        });
    }

    Ok(())
}
