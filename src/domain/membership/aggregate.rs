//! Membership aggregate entity.
//!
//! A user has at most one current membership: the most recently activated
//! plan. Every activation also appends an immutable ledger entry.
//!
//! # Design Decisions
//!
//! - **Latest plan wins**: activation overwrites, it never extends
//! - **Window from activation time**: `expires_at = started_at + duration_days`
//! - **Deduplication upstream**: the settlement claim guarantees one
//!   activation per payment

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId, PlanId, Timestamp, UserId};

use super::Plan;

/// Reference to the payment that bought a membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReference {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub method: Option<String>,
    pub verified: bool,
}

/// Membership aggregate - a user's current plan window.
///
/// # Invariants
///
/// - `started_at < expires_at`
/// - one membership per `user_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub title: String,
    /// Plan price in major units at activation time.
    pub price: i64,
    pub sessions_included: u32,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
    pub payment: PaymentReference,
    pub updated_at: Timestamp,
}

impl Membership {
    /// Derives the membership window for a plan activated at `now`.
    pub fn activate(user_id: UserId, plan: &Plan, payment: PaymentReference, now: Timestamp) -> Self {
        Self {
            user_id,
            plan_id: plan.id.clone(),
            title: plan.title.clone(),
            price: plan.price,
            sessions_included: plan.sessions_included,
            started_at: now,
            expires_at: now.plus_days(plan.duration_days),
            payment,
            updated_at: now,
        }
    }

    /// True when `now` lies inside the membership window.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.started_at <= now && now < self.expires_at
    }

    /// Days remaining at `now`, zero once expired.
    pub fn days_remaining(&self, now: Timestamp) -> i64 {
        if now >= self.expires_at {
            return 0;
        }
        self.expires_at.duration_since(&now).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::membership::PlanCatalog;

    fn now() -> Timestamp {
        Timestamp::parse_rfc3339("now", "2025-06-01T06:00:00Z").unwrap()
    }

    fn payment(id: &str) -> PaymentReference {
        PaymentReference {
            payment_id: PaymentId::new(id).unwrap(),
            order_id: OrderId::new("order_1").unwrap(),
            method: Some("card".to_string()),
            verified: true,
        }
    }

    fn plan(id: &str) -> Plan {
        PlanCatalog::standard()
            .get(&PlanId::new(id).unwrap())
            .cloned()
            .unwrap()
    }

    #[test]
    fn activate_sets_window_from_plan_duration() {
        let m = Membership::activate(UserId::new("u1").unwrap(), &plan("3-month-plan"), payment("pay_1"), now());
        assert_eq!(m.started_at, now());
        assert_eq!(m.expires_at, now().plus_days(90));
        assert_eq!(m.title, "3-Month Plan");
        assert_eq!(m.price, 33_999);
        assert_eq!(m.sessions_included, 48);
    }

    #[test]
    fn reactivation_does_not_stack_durations() {
        let user = UserId::new("u1").unwrap();
        let first = Membership::activate(user.clone(), &plan("lite"), payment("pay_1"), now());
        let later = now().plus_days(10);
        let second = Membership::activate(user, &plan("lite"), payment("pay_2"), later);

        assert_eq!(second.expires_at, later.plus_days(30));
        assert!(second.expires_at < first.expires_at.plus_days(30));
    }

    #[test]
    fn is_active_within_window_only() {
        let m = Membership::activate(UserId::new("u1").unwrap(), &plan("lite"), payment("pay_1"), now());
        assert!(m.is_active(now()));
        assert!(m.is_active(now().plus_days(29)));
        assert!(!m.is_active(now().plus_days(30)));
        assert!(!m.is_active(now().plus_days(-1)));
    }

    #[test]
    fn days_remaining_counts_down_to_zero() {
        let m = Membership::activate(UserId::new("u1").unwrap(), &plan("lite"), payment("pay_1"), now());
        assert_eq!(m.days_remaining(now()), 30);
        assert_eq!(m.days_remaining(now().plus_days(31)), 0);
    }

    #[test]
    fn serializes_camel_case() {
        let m = Membership::activate(UserId::new("u1").unwrap(), &plan("elite"), payment("pay_1"), now());
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["planId"], "elite");
        assert_eq!(json["payment"]["paymentId"], "pay_1");
        assert_eq!(json["payment"]["verified"], true);
    }
}
