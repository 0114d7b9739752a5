//! CancelBookingHandler - Command handler for cancelling a booking.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError, BookingPolicy, CancelOutcome};
use crate::domain::foundation::{BookingId, UserId};
use crate::ports::{BookingRepository, Clock, FinalizeResult};

/// Command to cancel one of the caller's bookings.
#[derive(Debug, Clone)]
pub struct CancelBookingCommand {
    pub booking_id: BookingId,
    pub user_id: UserId,
}

/// Result of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelBookingResult {
    pub outcome: CancelOutcome,
    pub booking: Booking,
}

/// Handler for cancelling bookings.
///
/// Cancelling at least the lead time ahead marks the booking cancelled;
/// later cancellations mark it used. Someone else's booking is reported as
/// not found.
pub struct CancelBookingHandler {
    repository: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl CancelBookingHandler {
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

    pub async fn handle(&self, cmd: CancelBookingCommand) -> Result<CancelBookingResult, BookingError> {
        let mut booking = self
            .repository
            .find_by_id(&cmd.booking_id)
            .await?
            .filter(|b| b.is_owned_by(&cmd.user_id))
            .ok_or(BookingError::NotFound(cmd.booking_id))?;

        let now = self.clock.now();
        let outcome = booking.cancel(&self.policy, now);
        if let CancelOutcome::AlreadyFinalized(_) = outcome {
            return Ok(CancelBookingResult { outcome, booking });
        }

        match self.repository.finalize(&booking.id, booking.status, now).await? {
            FinalizeResult::Applied => {
                tracing::info!(
                    booking_id = %booking.id,
                    outcome = outcome.as_str(),
                    "Booking cancelled"
                );
                Ok(CancelBookingResult { outcome, booking })
            }
            FinalizeResult::NotUpcoming => {
                // Lost a race with another cancel or a trainer closeout.
                let stored = self
                    .repository
                    .find_by_id(&booking.id)
                    .await?
                    .ok_or(BookingError::NotFound(booking.id))?;
                Ok(CancelBookingResult {
                    outcome: CancelOutcome::AlreadyFinalized(stored.status),
                    booking: stored,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryBookingStore;
    use crate::domain::booking::{BookingStatus, SessionCategory};
    use crate::domain::foundation::{PlanId, Timestamp, TrainerId};

    fn t0() -> Timestamp {
        Timestamp::parse_rfc3339("t0", "2025-06-01T06:00:00Z").unwrap()
    }

    async fn seeded(session_at: Timestamp) -> (Arc<InMemoryBookingStore>, Booking) {
        let store = Arc::new(InMemoryBookingStore::new());
        let booking = Booking::propose(
            UserId::new("u1").unwrap(),
            TrainerId::new("t1").unwrap(),
            PlanId::new("lite").unwrap(),
            SessionCategory::NutritionCoaching,
            session_at,
            &BookingPolicy::default(),
            t0(),
        )
        .unwrap();
        store
            .insert_if_available(&booking, BookingPolicy::default().conflict_window())
            .await
            .unwrap();
        (store, booking)
    }

    fn handler_at(store: Arc<InMemoryBookingStore>, now: Timestamp) -> CancelBookingHandler {
        CancelBookingHandler::new(store, Arc::new(FixedClock::new(now)), BookingPolicy::default())
    }

    fn cmd(booking: &Booking, user: &str) -> CancelBookingCommand {
        CancelBookingCommand {
            booking_id: booking.id,
            user_id: UserId::new(user).unwrap(),
        }
    }

    #[tokio::test]
    async fn cancel_exactly_at_boundary_is_cancelled() {
        let session = t0().plus_hours(24);
        let (store, booking) = seeded(session).await;

        let result = handler_at(store.clone(), session.plus_hours(-8))
            .handle(cmd(&booking, "u1"))
            .await
            .unwrap();

        assert_eq!(result.outcome, CancelOutcome::Cancelled);
        let stored = store.find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_one_minute_late_is_used() {
        let session = t0().plus_hours(24);
        let (store, booking) = seeded(session).await;

        let result = handler_at(store.clone(), session.plus_hours(-8).plus_minutes(1))
            .handle(cmd(&booking, "u1"))
            .await
            .unwrap();

        assert_eq!(result.outcome, CancelOutcome::Used);
        assert_eq!(result.booking.status, BookingStatus::Used);
    }

    #[tokio::test]
    async fn second_cancel_reports_already_finalized() {
        let session = t0().plus_hours(24);
        let (store, booking) = seeded(session).await;
        let h = handler_at(store, t0());

        h.handle(cmd(&booking, "u1")).await.unwrap();
        let second = h.handle(cmd(&booking, "u1")).await.unwrap();
        assert_eq!(
            second.outcome,
            CancelOutcome::AlreadyFinalized(BookingStatus::Cancelled)
        );
    }

    #[tokio::test]
    async fn other_users_booking_is_not_found() {
        let (store, booking) = seeded(t0().plus_hours(24)).await;
        let result = handler_at(store, t0()).handle(cmd(&booking, "intruder")).await;
        assert_eq!(result, Err(BookingError::NotFound(booking.id)));
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let store = Arc::new(InMemoryBookingStore::new());
        let id = BookingId::new();
        let result = handler_at(store, t0())
            .handle(CancelBookingCommand {
                booking_id: id,
                user_id: UserId::new("u1").unwrap(),
            })
            .await;
        assert_eq!(result, Err(BookingError::NotFound(id)));
    }
}
