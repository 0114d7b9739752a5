//! Axum router configuration for booking endpoints.

use axum::{routing::post, Router};

use super::handlers::{cancel_booking, list_bookings, propose_booking, BookingAppState};

/// All booking routes require a bearer token.
///
/// - `POST /bookings`
/// - `GET /bookings`
/// - `POST /bookings/:id/cancel`
pub fn booking_routes() -> Router<BookingAppState> {
    Router::new()
        .route("/bookings", post(propose_booking).get(list_bookings))
        .route("/bookings/:id/cancel", post(cancel_booking))
}
