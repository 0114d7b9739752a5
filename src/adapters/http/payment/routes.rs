//! Axum router configuration for payment endpoints.

use axum::{routing::post, Router};

use super::handlers::{create_order, handle_webhook, verify_checkout, PaymentAppState};

/// Order and verify accept an optional bearer token. The webhook is
/// authenticated by its body signature only.
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/payments/order", post(create_order))
        .route("/payments/verify", post(verify_checkout))
        .route("/payments/webhook", post(handle_webhook))
}
