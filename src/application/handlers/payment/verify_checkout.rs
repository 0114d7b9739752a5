//! VerifyCheckoutHandler - Verifies the checkout callback and settles it.
//!
//! # Check Order
//!
//! 1. Order id, payment id and signature present, else `MissingField`
//! 2. Key secret configured, else `NotConfigured`
//! 3. Signature matches, else `SignatureMismatch`
//! 4. Settle with source `callback`

use std::sync::Arc;

use crate::application::handlers::settlement::{SettlePaymentCommand, SettlePaymentHandler, SettleResult};
use crate::domain::foundation::{OrderId, PaymentId, PlanId, UserId};
use crate::domain::payment::{PaymentError, SignatureVerifier};
use crate::domain::settlement::{PaymentReport, SettlementSource};

/// Fields from the checkout callback. Missing fields stay `None` so the
/// handler can report which one is absent.
#[derive(Debug, Clone, Default)]
pub struct VerifyCheckoutCommand {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub plan_id: Option<PlanId>,
    pub user_id: Option<UserId>,
    pub raw_payload: serde_json::Value,
}

pub struct VerifyCheckoutHandler {
    verifier: Option<SignatureVerifier>,
    settle: Arc<SettlePaymentHandler>,
}

impl VerifyCheckoutHandler {
    pub fn new(verifier: Option<SignatureVerifier>, settle: Arc<SettlePaymentHandler>) -> Self {
        Self { verifier, settle }
    }

    pub async fn handle(&self, cmd: VerifyCheckoutCommand) -> Result<SettleResult, PaymentError> {
        let order_id = required(cmd.order_id, "orderId")?;
        let payment_id = required(cmd.payment_id, "paymentId")?;
        let signature = required(cmd.signature, "signature")?;

        let verifier = self.verifier.as_ref().ok_or_else(|| {
            tracing::error!("Checkout verification requested but RAZORPAY_KEY_SECRET is not set");
            PaymentError::NotConfigured("RAZORPAY_KEY_SECRET")
        })?;

        if let Err(mismatch) = verifier.verify_checkout(&order_id, &payment_id, &signature) {
            tracing::warn!(
                order_id = %order_id,
                payment_id = %payment_id,
                "Checkout signature mismatch"
            );
            return Err(mismatch.into());
        }

        let report = PaymentReport {
            payment_id: PaymentId::new(payment_id)?,
            order_id: OrderId::new(order_id)?,
            amount: None,
            currency: None,
            method: None,
            raw_payload: cmd.raw_payload,
            source: SettlementSource::Callback,
        };

        self.settle
            .handle(SettlePaymentCommand {
                report,
                user_id: cmd.user_id,
                plan_id: cmd.plan_id,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Verified checkout could not be recorded");
                PaymentError::persistence(e.to_string())
            })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, PaymentError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(PaymentError::MissingField(field)),
    }
}
