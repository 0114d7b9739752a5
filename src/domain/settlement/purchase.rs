//! Purchase (settlement record) entity.
//!
//! One purchase exists per gateway payment id. It is written by whichever
//! channel, checkout callback or webhook, reports the payment first. The
//! entitlement flag moves `pending → granted` exactly once.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    OrderId, PaymentId, PlanId, StateMachine, Timestamp, UserId, ValidationError,
};
use crate::domain::payment::MinorUnits;

/// Channel that reported the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementSource {
    Callback,
    Webhook,
}

impl SettlementSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementSource::Callback => "callback",
            SettlementSource::Webhook => "webhook",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "callback" => Ok(SettlementSource::Callback),
            "webhook" => Ok(SettlementSource::Webhook),
            other => Err(ValidationError::invalid_format(
                "source",
                format!("unknown settlement source '{}'", other),
            )),
        }
    }
}

/// Whether the membership bought by a purchase has been activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementState {
    Pending,
    Granted,
}

impl EntitlementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementState::Pending => "pending",
            EntitlementState::Granted => "granted",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pending" => Ok(EntitlementState::Pending),
            "granted" => Ok(EntitlementState::Granted),
            other => Err(ValidationError::invalid_format(
                "entitlement",
                format!("unknown entitlement state '{}'", other),
            )),
        }
    }
}

impl StateMachine for EntitlementState {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (EntitlementState::Pending, EntitlementState::Granted)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            EntitlementState::Pending => vec![EntitlementState::Granted],
            EntitlementState::Granted => vec![],
        }
    }
}

/// Who bought what. Both halves are needed to activate a membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchaser {
    pub user_id: UserId,
    pub plan_id: PlanId,
}

impl Purchaser {
    /// Combines optional halves, returning `None` unless both are present.
    pub fn from_parts(user_id: Option<UserId>, plan_id: Option<PlanId>) -> Option<Self> {
        Some(Self {
            user_id: user_id?,
            plan_id: plan_id?,
        })
    }
}

/// Settlement record keyed by payment id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub user_id: Option<UserId>,
    pub plan_id: Option<PlanId>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub method: Option<String>,
    pub raw_payload: serde_json::Value,
    pub source: SettlementSource,
    pub entitlement: EntitlementState,
    pub entitlement_granted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    /// Sweep passes that left the entitlement pending.
    pub sweep_attempts: u32,
    pub last_swept_at: Option<Timestamp>,
}

/// Fields of a payment report as received from one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReport {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub method: Option<String>,
    pub raw_payload: serde_json::Value,
    pub source: SettlementSource,
}

impl Purchase {
    /// Builds the record for a first-seen payment.
    pub fn record(report: PaymentReport, purchaser: Option<&Purchaser>, now: Timestamp) -> Self {
        Self {
            payment_id: report.payment_id,
            order_id: report.order_id,
            user_id: purchaser.map(|p| p.user_id.clone()),
            plan_id: purchaser.map(|p| p.plan_id.clone()),
            amount: report.amount,
            currency: report.currency,
            method: report.method,
            raw_payload: report.raw_payload,
            source: report.source,
            entitlement: EntitlementState::Pending,
            entitlement_granted_at: None,
            created_at: now,
            sweep_attempts: 0,
            last_swept_at: None,
        }
    }

    /// Purchaser recorded on the purchase, if both halves are known.
    pub fn purchaser(&self) -> Option<Purchaser> {
        Purchaser::from_parts(self.user_id.clone(), self.plan_id.clone())
    }

    pub fn is_entitlement_pending(&self) -> bool {
        self.entitlement == EntitlementState::Pending
    }

    /// Amount reported by the gateway, when the reporting channel carried one.
    pub fn reported_amount(&self) -> Option<MinorUnits> {
        self.amount.and_then(|amount| MinorUnits::new(amount).ok())
    }
}
