//! HandleWebhookHandler - Verifies and dispatches Razorpay webhooks.
//!
//! Verified events are acknowledged unless recording a captured payment
//! fails, so the sender redelivers only when a retry can help.

use std::sync::Arc;

use crate::application::handlers::settlement::{SettlePaymentCommand, SettlePaymentHandler, SettleResult};
use crate::domain::payment::{GatewayEvent, PaymentError, SignatureVerifier};
use crate::domain::settlement::{PaymentReport, SettlementSource};

#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    /// Untouched request body.
    pub body: Vec<u8>,
    /// `X-Razorpay-Signature` header value.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Settled(SettleResult),
    Ignored { event_type: String },
}

pub struct HandleWebhookHandler {
    verifier: Option<SignatureVerifier>,
    settle: Arc<SettlePaymentHandler>,
}

impl HandleWebhookHandler {
    pub fn new(verifier: Option<SignatureVerifier>, settle: Arc<SettlePaymentHandler>) -> Self {
        Self { verifier, settle }
    }

    pub async fn handle(&self, cmd: HandleWebhookCommand) -> Result<WebhookOutcome, PaymentError> {
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            tracing::error!("Webhook received but RAZORPAY_WEBHOOK_SECRET is not set");
            PaymentError::NotConfigured("RAZORPAY_WEBHOOK_SECRET")
        })?;

        let signature = cmd
            .signature
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(PaymentError::MissingField("x-razorpay-signature"))?;

        if let Err(mismatch) = verifier.verify_webhook(&cmd.body, signature) {
            tracing::warn!(body_len = cmd.body.len(), "Webhook signature mismatch");
            return Err(mismatch.into());
        }

        let captured = match GatewayEvent::parse(&cmd.body) {
            Ok(GatewayEvent::PaymentCaptured(captured)) => captured,
            Ok(GatewayEvent::Unknown { event_type }) => {
                tracing::debug!(event_type = %event_type, "Ignoring webhook event");
                return Ok(WebhookOutcome::Ignored { event_type });
            }
            Err(e) => {
                tracing::warn!(error = %e.0, "Ignoring malformed webhook payload");
                return Ok(WebhookOutcome::Ignored {
                    event_type: "malformed".to_string(),
                });
            }
        };

        let raw_payload = serde_json::from_slice(&cmd.body).unwrap_or_default();
        let report = PaymentReport {
            payment_id: captured.payment_id,
            order_id: captured.order_id,
            amount: captured.amount,
            currency: captured.currency,
            method: captured.method,
            raw_payload,
            source: SettlementSource::Webhook,
        };

        let result = self
            .settle
            .handle(SettlePaymentCommand {
                report,
                user_id: captured.user_id,
                plan_id: captured.plan_id,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Captured payment could not be recorded");
                PaymentError::persistence(e.to_string())
            })?;

        Ok(WebhookOutcome::Settled(result))
    }
}
