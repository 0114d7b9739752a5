//! Booking status state machine.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a training session booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Reserved and still ahead. The only status that occupies a slot.
    Upcoming,

    /// Cancelled by the member with enough notice. No session consumed.
    Cancelled,

    /// Cancelled too late. The session counts as consumed.
    Used,

    /// Closed out by the trainer after the session took place.
    Completed,
}

impl BookingStatus {
    /// Returns the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Upcoming => "upcoming",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Used => "used",
            BookingStatus::Completed => "completed",
        }
    }

    /// Returns true if a booking with this status blocks the trainer's slot.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, BookingStatus::Upcoming)
    }
}

impl StateMachine for BookingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            (Upcoming, Cancelled) | (Upcoming, Used) | (Upcoming, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use BookingStatus::*;
        match self {
            Upcoming => vec![Cancelled, Used, Completed],
            Cancelled | Used | Completed => vec![],
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(BookingStatus::Upcoming),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "used" => Ok(BookingStatus::Used),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown booking status '{}'", other),
            )),
        }
    }
}
