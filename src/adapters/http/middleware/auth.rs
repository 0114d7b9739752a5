//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - validates a Bearer token and injects the user into extensions
//! - `RequireAuth` - extractor that requires an authenticated user
//! - `OptionalAuth` - extractor for endpoints where identity is optional
//!
//! The middleware only depends on the `SessionValidator` port.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

use crate::adapters::http::error::ErrorResponse;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Validates `Authorization: Bearer <token>` when present.
///
/// A missing header passes through untouched so that `OptionalAuth` routes
/// keep working. A header that fails validation is rejected with 401
/// without reaching the handler.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!(error = %msg, "Auth service unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Authentication service unavailable",
                    )
                }
                AuthError::MissingToken | AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, "Invalid token")
                }
            };
            ErrorResponse::new("UNAUTHORIZED", message).into_response_with(status)
        }
    }
}

/// Extractor that requires authentication.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for optional authentication.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => {
                ErrorResponse::new("UNAUTHORIZED", "Authentication required")
                    .into_response_with(StatusCode::UNAUTHORIZED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> Router {
        let validator: AuthState =
            Arc::new(MockSessionValidator::new().with_test_user("good-token", "user-123"));

        Router::new()
            .route(
                "/private",
                get(|RequireAuth(user): RequireAuth| async move { user.id.to_string() }),
            )
            .route(
                "/public",
                get(|OptionalAuth(user): OptionalAuth| async move {
                    user.map(|u| u.id.to_string()).unwrap_or_else(|| "guest".to_string())
                }),
            )
            .layer(axum::middleware::from_fn_with_state(validator, auth_middleware))
    }

    async fn get_with(path: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let response = app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Middleware
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_token_reaches_handler_as_user() {
        let (status, body) = get_with("/private", Some("good-token")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user-123");
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_before_handler() {
        let (status, body) = get_with("/public", Some("forged")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("\"ok\":false"));
    }

    #[tokio::test]
    async fn missing_token_on_required_route_is_401() {
        let (status, _) = get_with("/private", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_token_on_optional_route_is_guest() {
        let (status, body) = get_with("/public", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "guest");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Type Safety
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn auth_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
        assert_send_sync::<RequireAuth>();
        assert_send_sync::<OptionalAuth>();
    }
}
