//! Booking domain module.
//!
//! One-on-one session reservations with a minimum lead time and a
//! per-trainer conflict window.
//!
//! # Module Structure
//!
//! - `aggregate` - Booking entity and cancellation outcomes
//! - `category` - SessionCategory closed enum
//! - `policy` - Lead-time and conflict-window rules
//! - `status` - BookingStatus state machine
//! - `errors` - BookingError

mod aggregate;
mod category;
mod errors;
mod policy;
mod status;

pub use aggregate::{Booking, CancelOutcome};
pub use category::SessionCategory;
pub use errors::BookingError;
pub use policy::{BookingPolicy, DEFAULT_CONFLICT_WINDOW_MINUTES, DEFAULT_LEAD_TIME_HOURS};
pub use status::BookingStatus;
