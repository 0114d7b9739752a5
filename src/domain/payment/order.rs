//! Order (payment intent) entity and receipt generation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{
    OrderId, PaymentId, PlanId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{Currency, MinorUnits};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "created" => Ok(OrderStatus::Created),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown order status '{}'", other),
            )),
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (OrderStatus::Created, OrderStatus::Paid))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            OrderStatus::Created => vec![OrderStatus::Paid],
            OrderStatus::Paid => vec![],
        }
    }
}

/// Client-side receipt reference sent with the create-order request.
///
/// Format: `rcpt_<unix-millis>_<8 hex>`. Unique per call; advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(String);

impl Receipt {
    pub fn generate(now: Timestamp) -> Self {
        let suffix = Uuid::new_v4().as_u128() as u32;
        Self(format!("rcpt_{}_{:08x}", now.as_unix_millis(), suffix))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A gateway order plus the local context needed to settle it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub amount: MinorUnits,
    pub currency: Currency,
    pub receipt: Receipt,
    pub status: OrderStatus,
    pub user_id: Option<UserId>,
    pub plan_id: Option<PlanId>,
    pub payment_id: Option<PaymentId>,
    pub created_at: Timestamp,
    pub paid_at: Option<Timestamp>,
}

impl Order {
    /// Records a freshly created gateway order.
    pub fn created(
        id: OrderId,
        amount: MinorUnits,
        currency: Currency,
        receipt: Receipt,
        user_id: Option<UserId>,
        plan_id: Option<PlanId>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            amount,
            currency,
            receipt,
            status: OrderStatus::Created,
            user_id,
            plan_id,
            payment_id: None,
            created_at: now,
            paid_at: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// Transitions created → paid.
    ///
    /// # Errors
    ///
    /// Fails if the order is already paid.
    pub fn mark_paid(&mut self, payment_id: PaymentId, now: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(OrderStatus::Paid)?;
        self.payment_id = Some(payment_id);
        self.paid_at = Some(now);
        Ok(())
    }
}
