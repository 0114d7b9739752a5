//! Booking handlers.
//!
//! ## Commands
//! - Proposing a booking (lead time + atomic conflict check)
//! - Cancelling a booking (cancelled / used / already finalized)
//!
//! ## Queries
//! - Listing a user's bookings

mod cancel_booking;
mod list_bookings;
mod propose_booking;

pub use cancel_booking::{CancelBookingCommand, CancelBookingHandler, CancelBookingResult};
pub use list_bookings::{ListBookingsHandler, ListBookingsQuery};
pub use propose_booking::{ProposeBookingCommand, ProposeBookingHandler};
