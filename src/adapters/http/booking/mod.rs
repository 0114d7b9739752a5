//! HTTP adapter for booking endpoints.
//!
//! - `POST /bookings` - Propose a session with a trainer
//! - `GET /bookings` - List the caller's bookings
//! - `POST /bookings/:id/cancel` - Cancel one booking

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{BookingApiError, BookingAppState};
pub use routes::booking_routes;
