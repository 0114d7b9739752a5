//! Booking repository port.
//!
//! # Atomicity
//!
//! `insert_if_available` is the only way to create a booking. The conflict
//! check and the insert must behave as one atomic unit per trainer: two
//! concurrent proposals for overlapping slots of one trainer yield exactly
//! one `Inserted` and one `Conflict`.
//!
//! `finalize` is a conditional write that only succeeds on an upcoming
//! booking, so concurrent cancellations finalize once.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::foundation::{BookingId, DomainError, Timestamp, UserId};

/// Result of an atomic check-and-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// No upcoming booking of the trainer within the window; stored.
    Inserted,
    /// An upcoming booking of the trainer lies strictly within the window.
    Conflict { existing: BookingId },
}

/// Result of a conditional status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeResult {
    /// The booking was upcoming and now has the requested status.
    Applied,
    /// The booking was no longer upcoming; nothing changed.
    NotUpcoming,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts `booking` unless another upcoming booking of the same trainer
    /// starts strictly less than `window` away.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert_if_available(
        &self,
        booking: &Booking,
        window: Duration,
    ) -> Result<ReserveOutcome, DomainError>;

    /// Find a booking by its ID.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError>;

    /// All bookings of a user ordered by `session_at` ascending.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Booking>, DomainError>;

    /// Moves an upcoming booking to `status`.
    ///
    /// Must be conditional on the stored status still being upcoming.
    async fn finalize(
        &self,
        id: &BookingId,
        status: BookingStatus,
        now: Timestamp,
    ) -> Result<FinalizeResult, DomainError>;
}
