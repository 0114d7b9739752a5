//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.
//! `api_router` assembles them behind the bearer-token middleware.

pub mod booking;
pub mod error;
pub mod membership;
pub mod middleware;
pub mod payment;

pub use booking::{booking_routes, BookingAppState};
pub use error::ErrorResponse;
pub use membership::{membership_routes, MembershipAppState};
pub use payment::{payment_routes, PaymentAppState};

use axum::{routing::get, Json, Router};

use middleware::{auth_middleware, AuthState};

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Builds the full API router.
///
/// The auth middleware runs on every route; it only rejects requests that
/// present an invalid token, so the webhook and health routes stay open.
pub fn api_router(
    booking: BookingAppState,
    payment: PaymentAppState,
    membership: MembershipAppState,
    auth: AuthState,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(booking_routes().with_state(booking))
        .merge(payment_routes().with_state(payment))
        .merge(membership_routes().with_state(membership))
        .layer(axum::middleware::from_fn_with_state(auth, auth_middleware))
}
