//! Razorpay webhook envelopes.
//!
//! Only the fields needed for settlement are captured. Unknown event types
//! parse successfully into [`GatewayEvent::Unknown`] so they can be
//! acknowledged without action.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{OrderId, PaymentId, PlanId, UserId};

/// Event type acted on by the settlement path.
pub const PAYMENT_CAPTURED: &str = "payment.captured";

/// Envelope could not be interpreted after its signature was verified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed webhook envelope: {0}")]
pub struct MalformedEvent(pub String);

/// Parsed webhook event.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// A payment was captured and funds will settle.
    PaymentCaptured(CapturedPayment),

    /// Any other event type. Acknowledged, not processed.
    Unknown { event_type: String },
}

/// The payment entity carried by a `payment.captured` event.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPayment {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub method: Option<String>,
    /// Purchaser context echoed back from the order's notes, when present.
    pub user_id: Option<UserId>,
    pub plan_id: Option<PlanId>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    order_id: Option<String>,
    amount: Option<i64>,
    currency: Option<String>,
    method: Option<String>,
    #[serde(default)]
    notes: serde_json::Value,
}

/// Order notes written at order creation and echoed on payment entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotes {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "planId", skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

impl GatewayEvent {
    /// Parses raw body bytes. Call only after the signature has been verified.
    pub fn parse(body: &[u8]) -> Result<Self, MalformedEvent> {
        let envelope: Envelope =
            serde_json::from_slice(body).map_err(|e| MalformedEvent(e.to_string()))?;

        if envelope.event != PAYMENT_CAPTURED {
            return Ok(GatewayEvent::Unknown {
                event_type: envelope.event,
            });
        }

        let entity = envelope
            .payload
            .get("payment")
            .and_then(|p| p.get("entity"))
            .cloned()
            .ok_or_else(|| MalformedEvent("missing payload.payment.entity".to_string()))?;
        let entity: PaymentEntity =
            serde_json::from_value(entity).map_err(|e| MalformedEvent(e.to_string()))?;

        let payment_id =
            PaymentId::new(entity.id).map_err(|e| MalformedEvent(e.to_string()))?;
        let order_id = entity
            .order_id
            .ok_or_else(|| MalformedEvent("payment has no order_id".to_string()))
            .and_then(|id| OrderId::new(id).map_err(|e| MalformedEvent(e.to_string())))?;

        // Razorpay sends `notes: []` when empty.
        let notes: OrderNotes = serde_json::from_value(entity.notes).unwrap_or_default();

        Ok(GatewayEvent::PaymentCaptured(CapturedPayment {
            payment_id,
            order_id,
            amount: entity.amount,
            currency: entity.currency,
            method: entity.method,
            user_id: notes.user_id.and_then(|id| UserId::new(id).ok()),
            plan_id: notes.plan_id.and_then(|id| PlanId::new(id).ok()),
        }))
    }

    pub fn event_type(&self) -> &str {
        match self {
            GatewayEvent::PaymentCaptured(_) => PAYMENT_CAPTURED,
            GatewayEvent::Unknown { event_type } => event_type,
        }
    }
}
