//! Booking-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | LeadTime | 400 |
//! | NotFound | 404 |
//! | SlotTaken | 409 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, Timestamp, TrainerId, ValidationError,
};

/// Errors raised by the booking scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// Input failed value-object validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Session starts sooner than the minimum lead time.
    #[error("Sessions must be booked at least {hours} hours in advance")]
    LeadTime { hours: i64 },

    /// Another upcoming session of the same trainer is too close.
    #[error("Trainer {trainer_id} already has a session near {session_at}")]
    SlotTaken {
        trainer_id: TrainerId,
        session_at: String,
    },

    /// Booking does not exist or belongs to someone else.
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// Store failure.
    #[error("Booking store error: {0}")]
    Infrastructure(String),
}

impl BookingError {
    pub fn slot_taken(trainer_id: TrainerId, session_at: Timestamp) -> Self {
        BookingError::SlotTaken {
            trainer_id,
            session_at: session_at.to_rfc3339(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BookingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::Validation(_) => ErrorCode::ValidationFailed,
            BookingError::LeadTime { .. } => ErrorCode::LeadTime,
            BookingError::SlotTaken { .. } => ErrorCode::SlotTaken,
            BookingError::NotFound(_) => ErrorCode::BookingNotFound,
            BookingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for BookingError {
    fn from(err: DomainError) -> Self {
        BookingError::Infrastructure(err.to_string())
    }
}
