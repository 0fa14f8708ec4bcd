use serde::{Deserialize, Serialize};

use crate::user::models::{TokenAccess, UserModel};

/// Name of the header carrying the session token in both directions
pub const X_AUTH_HEADER: &str = "x-auth";

/// JWT claims structure binding a token to its user
///
/// There is deliberately no expiry claim: a token dies when its entry is
/// removed from the user's stored token list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    pub user_id: String,
    pub access: TokenAccess,
}

/// Request body for POST /users
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for POST /users/login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public projection of a user, safe to send over the wire
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

impl From<&UserModel> for UserResponse {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
        }
    }
}

/// Authenticated requester, inserted into request extensions by `require_auth`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserModel,
    pub token: String,
}
