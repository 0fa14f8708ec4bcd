use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use super::service::AuthService;
use super::types::{
    AuthenticatedUser, LoginRequest, RegisterRequest, UserResponse, X_AUTH_HEADER,
};
use crate::shared::{AppError, AppState};

/// POST /users - register a new account and start its first session
#[instrument(name = "register_user", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = AuthService::from_state(&state);
    let (user, token) = service.register(&request.email, &request.password).await?;

    Ok(([(X_AUTH_HEADER, token)], Json(UserResponse::from(&user))))
}

/// POST /users/login - verify credentials and start a new session
#[instrument(name = "login_user", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = AuthService::from_state(&state);
    let (user, token) = service.login(&request.email, &request.password).await?;

    Ok(([(X_AUTH_HEADER, token)], Json(UserResponse::from(&user))))
}

/// GET /users/me - return the profile of the authenticated user
#[instrument(name = "current_user", skip(auth))]
pub async fn me(Extension(auth): Extension<AuthenticatedUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.user))
}

/// DELETE /users/me/token - end the session whose token authenticated this call
#[instrument(name = "logout_user", skip(state, auth))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<StatusCode, AppError> {
    let service = AuthService::from_state(&state);
    service.logout(&auth.user.id, &auth.token).await?;

    Ok(StatusCode::OK)
}
