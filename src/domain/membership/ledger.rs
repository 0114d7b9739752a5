//! Membership ledger: one immutable entry per activation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId, PlanId, Timestamp, UserId};

use super::Membership;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub title: String,
    pub price: i64,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub recorded_at: Timestamp,
}

impl LedgerEntry {
    pub fn for_activation(membership: &Membership) -> Self {
        Self {
            user_id: membership.user_id.clone(),
            plan_id: membership.plan_id.clone(),
            title: membership.title.clone(),
            price: membership.price,
            started_at: membership.started_at,
            expires_at: membership.expires_at,
            payment_id: membership.payment.payment_id.clone(),
            order_id: membership.payment.order_id.clone(),
            recorded_at: membership.updated_at,
        }
    }
}
