use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use user_api::X_AUTH_HEADER;

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

/// Everything a test wants to inspect about a finished API call
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// The x-auth token carried by register and login responses
    pub fn auth_token(&self) -> Option<String> {
        self.headers
            .get(X_AUTH_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
    }

    /// The parsed JSON body, panicking when the response had none
    pub fn json(&self) -> &Value {
        self.body.as_ref().expect("response had no JSON body")
    }
}

impl TestSetup {
    /// Send a raw request through the router
    pub async fn send(&self, request: Request<Body>) -> ApiResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };

        ApiResponse {
            status,
            headers,
            body,
        }
    }

    /// POST a JSON body to the given path
    pub async fn post_json(&self, uri: &str, body: Value) -> ApiResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GET the given path with an x-auth token
    pub async fn get_with_token(&self, uri: &str, token: &str) -> ApiResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(X_AUTH_HEADER, token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// GET the given path without any credentials
    pub async fn get_anonymous(&self, uri: &str) -> ApiResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// DELETE the given path with an x-auth token
    pub async fn delete_with_token(&self, uri: &str, token: &str) -> ApiResponse {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .header(X_AUTH_HEADER, token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Register a new account through the API
    pub async fn register(&self, email: &str, password: &str) -> ApiResponse {
        self.post_json("/users", json!({ "email": email, "password": password }))
            .await
    }

    /// Log in through the API
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse {
        self.post_json("/users/login", json!({ "email": email, "password": password }))
            .await
    }

    /// Fetch the profile behind a token
    pub async fn me(&self, token: &str) -> ApiResponse {
        self.get_with_token("/users/me", token).await
    }

    /// Log out the session behind a token
    pub async fn logout(&self, token: &str) -> ApiResponse {
        self.delete_with_token("/users/me/token", token).await
    }
}
