//! Booking aggregate entity.
//!
//! A booking reserves one trainer for one session start time. Within a
//! single trainer, no two upcoming bookings may sit closer than the policy's
//! conflict window. That invariant spans bookings, so it is enforced by the
//! repository's atomic check-and-insert rather than by this type.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BookingId, PlanId, StateMachine, Timestamp, TrainerId, UserId,
};

use super::{BookingError, BookingPolicy, BookingStatus, SessionCategory};

/// Booking aggregate - one reserved session.
///
/// # Invariants
///
/// - `session_at` has minute precision
/// - at creation, `session_at >= created_at + lead_time`
/// - status transitions follow [`BookingStatus`] rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub trainer_id: TrainerId,
    pub plan_id: PlanId,
    pub category: SessionCategory,
    pub session_at: Timestamp,
    pub status: BookingStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of a cancellation request against one booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Cancelled with enough notice.
    Cancelled,
    /// Cancelled too late; the session is consumed.
    Used,
    /// The booking had already reached a terminal status.
    AlreadyFinalized(BookingStatus),
}

impl CancelOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelOutcome::Cancelled => "cancelled",
            CancelOutcome::Used => "used",
            CancelOutcome::AlreadyFinalized(_) => "already_finalized",
        }
    }
}

impl Booking {
    /// Creates a new upcoming booking after checking the lead-time rule.
    ///
    /// `session_at` is truncated to the minute before any check.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::LeadTime` if the session starts too soon.
    pub fn propose(
        user_id: UserId,
        trainer_id: TrainerId,
        plan_id: PlanId,
        category: SessionCategory,
        session_at: Timestamp,
        policy: &BookingPolicy,
        now: Timestamp,
    ) -> Result<Self, BookingError> {
        let session_at = session_at.truncate_to_minute();
        if !policy.meets_lead_time(session_at, now) {
            return Err(BookingError::LeadTime {
                hours: policy.lead_time().num_hours(),
            });
        }

        Ok(Self {
            id: BookingId::new(),
            user_id,
            trainer_id,
            plan_id,
            category,
            session_at,
            status: BookingStatus::Upcoming,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a booking from storage without validation.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: BookingId,
        user_id: UserId,
        trainer_id: TrainerId,
        plan_id: PlanId,
        category: SessionCategory,
        session_at: Timestamp,
        status: BookingStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            trainer_id,
            plan_id,
            category,
            session_at,
            status,
            created_at,
            updated_at,
        }
    }

    /// Returns true if the given user owns this booking.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Decides the cancellation outcome at `now` without mutating.
    pub fn cancellation_outcome(&self, policy: &BookingPolicy, now: Timestamp) -> CancelOutcome {
        if self.status.is_terminal() {
            return CancelOutcome::AlreadyFinalized(self.status);
        }
        match policy.cancellation_outcome(self.session_at, now) {
            BookingStatus::Cancelled => CancelOutcome::Cancelled,
            _ => CancelOutcome::Used,
        }
    }

    /// Applies a cancellation at `now`.
    ///
    /// Terminal bookings are left untouched and reported as
    /// `AlreadyFinalized`.
    pub fn cancel(&mut self, policy: &BookingPolicy, now: Timestamp) -> CancelOutcome {
        let outcome = self.cancellation_outcome(policy, now);
        let target = match outcome {
            CancelOutcome::Cancelled => BookingStatus::Cancelled,
            CancelOutcome::Used => BookingStatus::Used,
            CancelOutcome::AlreadyFinalized(_) => return outcome,
        };
        if let Ok(next) = self.status.transition_to(target) {
            self.status = next;
            self.updated_at = now;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Timestamp {
        Timestamp::parse_rfc3339("at", s).unwrap()
    }

    fn now() -> Timestamp {
        at("2025-06-01T06:00:00Z")
    }

    fn propose_at(session_at: Timestamp) -> Result<Booking, BookingError> {
        Booking::propose(
            UserId::new("user-1").unwrap(),
            TrainerId::new("trainer-1").unwrap(),
            PlanId::new("lite").unwrap(),
            SessionCategory::BoxingFitness,
            session_at,
            &BookingPolicy::default(),
            now(),
        )
    }

    #[test]
    fn propose_creates_upcoming_booking() {
        let booking = propose_at(now().plus_hours(24)).unwrap();
        assert_eq!(booking.status, BookingStatus::Upcoming);
        assert_eq!(booking.created_at, now());
        assert_eq!(booking.updated_at, now());
    }

    #[test]
    fn propose_truncates_seconds() {
        let booking = propose_at(at("2025-06-02T10:15:37Z")).unwrap();
        assert_eq!(booking.session_at, at("2025-06-02T10:15:00Z"));
    }

    #[test]
    fn propose_rejects_seven_hours_fifty_nine_minutes() {
        let result = propose_at(now().plus_hours(7).plus_minutes(59));
        assert_eq!(result, Err(BookingError::LeadTime { hours: 8 }));
    }

    #[test]
    fn propose_accepts_exactly_eight_hours() {
        assert!(propose_at(now().plus_hours(8)).is_ok());
    }

    #[test]
    fn cancel_with_notice_marks_cancelled() {
        let mut booking = propose_at(now().plus_hours(24)).unwrap();
        let outcome = booking.cancel(&BookingPolicy::default(), now().plus_hours(16));
        assert_eq!(outcome, CancelOutcome::Cancelled);
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.updated_at, now().plus_hours(16));
    }

    #[test]
    fn late_cancel_marks_used() {
        let mut booking = propose_at(now().plus_hours(24)).unwrap();
        let outcome = booking.cancel(
            &BookingPolicy::default(),
            now().plus_hours(16).plus_minutes(1),
        );
        assert_eq!(outcome, CancelOutcome::Used);
        assert_eq!(booking.status, BookingStatus::Used);
    }

    #[test]
    fn cancelling_terminal_booking_reports_already_finalized() {
        let mut booking = propose_at(now().plus_hours(24)).unwrap();
        booking.cancel(&BookingPolicy::default(), now());
        let before = booking.clone();

        let outcome = booking.cancel(&BookingPolicy::default(), now());
        assert_eq!(outcome, CancelOutcome::AlreadyFinalized(BookingStatus::Cancelled));
        assert_eq!(booking, before);
    }

    #[test]
    fn ownership_check() {
        let booking = propose_at(now().plus_hours(24)).unwrap();
        assert!(booking.is_owned_by(&UserId::new("user-1").unwrap()));
        assert!(!booking.is_owned_by(&UserId::new("user-2").unwrap()));
    }

    #[test]
    fn serializes_camel_case() {
        let booking = propose_at(at("2025-06-02T10:00:00Z")).unwrap();
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["trainerId"], "trainer-1");
        assert_eq!(json["sessionAt"], "2025-06-02T10:00:00Z");
        assert_eq!(json["category"], "boxing_fitness");
        assert_eq!(json["status"], "upcoming");
    }
}
