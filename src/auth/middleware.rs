use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::service::AuthService;
use super::types::{AuthenticatedUser, X_AUTH_HEADER};
use crate::shared::{AppError, AppState};

/// Middleware that resolves the x-auth header to a user
///
/// Apply with `route_layer(middleware::from_fn_with_state(state, require_auth))`.
/// Handlers behind it read the user via `Extension<AuthenticatedUser>`.
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), "Authenticating request");

    let Some(token) = req
        .headers()
        .get(X_AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("Missing x-auth header in request");
        return Err(AppError::Unauthorized);
    };

    let service = AuthService::from_state(&state);
    let user = service.authenticate(token).await?;

    let token = token.to_string();
    req.extensions_mut().insert(AuthenticatedUser { user, token });

    Ok(next.run(req).await)
}
