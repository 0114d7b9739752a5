//! Response bodies for membership endpoints.

use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::domain::membership::Membership;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReferenceResponse {
    pub payment_id: String,
    pub order_id: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipViewResponse {
    pub plan_id: String,
    pub title: String,
    pub price: i64,
    pub sessions_included: u32,
    pub started_at: String,
    pub expires_at: String,
    pub active: bool,
    pub days_remaining: i64,
    pub payment: PaymentReferenceResponse,
}

impl MembershipViewResponse {
    pub fn at(membership: Membership, now: Timestamp) -> Self {
        Self {
            active: membership.is_active(now),
            days_remaining: membership.days_remaining(now),
            plan_id: membership.plan_id.to_string(),
            title: membership.title,
            price: membership.price,
            sessions_included: membership.sessions_included,
            started_at: membership.started_at.to_rfc3339(),
            expires_at: membership.expires_at.to_rfc3339(),
            payment: PaymentReferenceResponse {
                payment_id: membership.payment.payment_id.to_string(),
                order_id: membership.payment.order_id.to_string(),
                verified: membership.payment.verified,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipResponse {
    pub membership: Option<MembershipViewResponse>,
}
