//! Scheduling rules: minimum lead time and per-trainer conflict window.
//!
//! Both rules share one lead time: a session must be booked at least
//! `lead_time` ahead, and cancelling with at least `lead_time` notice
//! releases the session without penalty.

use chrono::Duration;

use crate::domain::foundation::Timestamp;

use super::BookingStatus;

/// Default minimum notice for booking and penalty-free cancellation.
pub const DEFAULT_LEAD_TIME_HOURS: i64 = 8;

/// Default minimum spacing between two upcoming sessions of one trainer.
pub const DEFAULT_CONFLICT_WINDOW_MINUTES: i64 = 45;

/// Scheduling policy applied by the booking scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    lead_time: Duration,
    conflict_window: Duration,
}

impl BookingPolicy {
    pub fn new(lead_time: Duration, conflict_window: Duration) -> Self {
        Self {
            lead_time,
            conflict_window,
        }
    }

    /// Builds a policy from whole hours and minutes, as configured.
    pub fn from_config(lead_time_hours: u32, conflict_window_minutes: u32) -> Self {
        Self::new(
            Duration::hours(i64::from(lead_time_hours)),
            Duration::minutes(i64::from(conflict_window_minutes)),
        )
    }

    pub fn lead_time(&self) -> Duration {
        self.lead_time
    }

    pub fn conflict_window(&self) -> Duration {
        self.conflict_window
    }

    /// True when `session_at` is at least the lead time after `now`.
    ///
    /// Exactly `now + lead_time` satisfies the rule.
    pub fn meets_lead_time(&self, session_at: Timestamp, now: Timestamp) -> bool {
        session_at.duration_since(&now) >= self.lead_time
    }

    /// True when two sessions of the same trainer are strictly closer than
    /// the conflict window. Sessions exactly one window apart do not conflict.
    pub fn conflicts(&self, a: Timestamp, b: Timestamp) -> bool {
        a.duration_since(&b).abs() < self.conflict_window
    }

    /// Status a booking reaches when the member cancels at `now`.
    ///
    /// The boundary is inclusive: cancelling exactly `lead_time` before the
    /// session is still penalty-free.
    pub fn cancellation_outcome(&self, session_at: Timestamp, now: Timestamp) -> BookingStatus {
        if now <= session_at.minus(self.lead_time) {
            BookingStatus::Cancelled
        } else {
            BookingStatus::Used
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::new(
            Duration::hours(DEFAULT_LEAD_TIME_HOURS),
            Duration::minutes(DEFAULT_CONFLICT_WINDOW_MINUTES),
        )
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

    // ════════════════════════════════════════════════════════════════
    // Lead time
    // ════════════════════════════════════════════════════════════════

    #[test]
    fn session_at_exactly_lead_time_is_allowed() {
        let policy = BookingPolicy::default();
        assert!(policy.meets_lead_time(now().plus_hours(8), now()));
    }

    #[test]
    fn session_one_minute_short_of_lead_time_is_rejected() {
        let policy = BookingPolicy::default();
        assert!(!policy.meets_lead_time(now().plus_hours(7).plus_minutes(59), now()));
    }

    #[test]
    fn past_session_is_rejected() {
        let policy = BookingPolicy::default();
        assert!(!policy.meets_lead_time(now().plus_hours(-1), now()));
    }

    // ════════════════════════════════════════════════════════════════
    // Conflict window
    // ════════════════════════════════════════════════════════════════

    #[test]
    fn sessions_44_minutes_apart_conflict() {
        let policy = BookingPolicy::default();
        let a = at("2025-06-02T10:00:00Z");
        assert!(policy.conflicts(a, a.plus_minutes(44)));
        assert!(policy.conflicts(a.plus_minutes(44), a));
    }

    #[test]
    fn sessions_45_minutes_apart_do_not_conflict() {
        let policy = BookingPolicy::default();
        let a = at("2025-06-02T10:00:00Z");
        assert!(!policy.conflicts(a, a.plus_minutes(45)));
        assert!(!policy.conflicts(a, a.plus_minutes(-45)));
    }

    #[test]
    fn identical_sessions_conflict() {
        let policy = BookingPolicy::default();
        let a = at("2025-06-02T10:00:00Z");
        assert!(policy.conflicts(a, a));
    }

    // ════════════════════════════════════════════════════════════════
    // Cancellation
    // ════════════════════════════════════════════════════════════════

    #[test]
    fn cancel_exactly_at_boundary_is_penalty_free() {
        let policy = BookingPolicy::default();
        let session = at("2025-06-02T10:00:00Z");
        let outcome = policy.cancellation_outcome(session, session.plus_hours(-8));
        assert_eq!(outcome, BookingStatus::Cancelled);
    }

    #[test]
    fn cancel_one_minute_after_boundary_is_used() {
        let policy = BookingPolicy::default();
        let session = at("2025-06-02T10:00:00Z");
        let outcome = policy.cancellation_outcome(session, session.plus_hours(-8).plus_minutes(1));
        assert_eq!(outcome, BookingStatus::Used);
    }

    #[test]
    fn from_config_matches_default() {
        assert_eq!(BookingPolicy::from_config(8, 45), BookingPolicy::default());
    }
}
