//! Request and response bodies for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{SettleResult, WebhookOutcome};
use crate::domain::payment::Order;

/// Body of `POST /payments/order`.
///
/// `amount` is kept as raw JSON so that numbers and numeric strings are
/// both accepted and converted by `MinorUnits::from_json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: serde_json::Value,
    pub plan_id: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBody {
    pub id: String,
    /// Minor units, as the gateway expects it at checkout.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub ok: bool,
    pub order: OrderBody,
}

impl From<Order> for CreateOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            ok: true,
            order: OrderBody {
                id: order.id.to_string(),
                amount: order.amount.value(),
                currency: order.currency.to_string(),
                receipt: order.receipt.as_str().to_string(),
            },
        }
    }
}

/// Body of `POST /payments/verify`.
///
/// Accepts the checkout widget's `razorpay_*` names as well as camelCase
/// and snake_case spellings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyCheckoutRequest {
    #[serde(alias = "orderId", alias = "razorpay_order_id")]
    pub order_id: Option<String>,
    #[serde(alias = "paymentId", alias = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(alias = "razorpay_signature")]
    pub signature: Option<String>,
    #[serde(alias = "planId")]
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyCheckoutResponse {
    pub ok: bool,
    pub verified: bool,
    pub settlement: &'static str,
    pub entitlement: &'static str,
}

impl From<SettleResult> for VerifyCheckoutResponse {
    fn from(result: SettleResult) -> Self {
        Self {
            ok: true,
            verified: true,
            settlement: result.outcome.as_str(),
            entitlement: result.entitlement.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub ok: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitlement: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl From<WebhookOutcome> for WebhookAckResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::Settled(result) => Self {
                ok: true,
                status: "processed",
                settlement: Some(result.outcome.as_str()),
                entitlement: Some(result.entitlement.as_str()),
                event: None,
            },
            WebhookOutcome::Ignored { event_type } => Self {
                ok: true,
                status: "ignored",
                settlement: None,
                entitlement: None,
                event: Some(event_type),
            },
        }
    }
}
