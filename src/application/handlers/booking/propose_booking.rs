//! ProposeBookingHandler - Command handler for reserving a training session.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError, BookingPolicy, SessionCategory};
use crate::domain::foundation::{PlanId, Timestamp, TrainerId, UserId};
use crate::ports::{BookingRepository, Clock, ReserveOutcome};

/// Command to reserve a session with a trainer.
#[derive(Debug, Clone)]
pub struct ProposeBookingCommand {
    pub user_id: UserId,
    pub trainer_id: TrainerId,
    pub plan_id: PlanId,
    pub category: SessionCategory,
    pub session_at: Timestamp,
}

/// Handler for proposing bookings.
///
/// Checks the lead-time rule first, then hands the conflict check and the
/// insert to the repository as one atomic step.
pub struct ProposeBookingHandler {
    repository: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl ProposeBookingHandler {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    pub async fn handle(&self, cmd: ProposeBookingCommand) -> Result<Booking, BookingError> {
        let now = self.clock.now();

        // 1. Lead time, regardless of conflicts
        let booking = Booking::propose(
            cmd.user_id,
            cmd.trainer_id,
            cmd.plan_id,
            cmd.category,
            cmd.session_at,
            &self.policy,
            now,
        )?;

        // 2 + 3. Conflict check and insert, atomically
        match self
            .repository
            .insert_if_available(&booking, self.policy.conflict_window())
            .await?
        {
            ReserveOutcome::Inserted => {
                tracing::info!(
                    booking_id = %booking.id,
                    trainer_id = %booking.trainer_id,
                    session_at = %booking.session_at.to_rfc3339(),
                    "Booking created"
                );
                Ok(booking)
            }
            ReserveOutcome::Conflict { existing } => {
                tracing::info!(
                    trainer_id = %booking.trainer_id,
                    session_at = %booking.session_at.to_rfc3339(),
                    conflicting_booking = %existing,
                    "Booking rejected, slot taken"
                );
                Err(BookingError::slot_taken(booking.trainer_id, booking.session_at))
            }
        }
    }
}
