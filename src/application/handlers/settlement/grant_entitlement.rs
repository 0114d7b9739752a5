//! EntitlementGranter - Activates the membership a settled purchase bought.
//!
//! Activation and its deduplication happen in one membership-store write
//! keyed by payment id. The purchase's entitlement flag flips to `granted`
//! only afterwards, so a failure between the two leaves the purchase pending
//! and the next attempt finds the ledger entry and just flips the flag.
//!
//! The plan must be paid for in full: the captured amount, or the cached
//! order's amount when the reporting channel carried none, has to equal the
//! plan's price.

use std::sync::Arc;

use crate::application::handlers::membership::{ActivateEntitlementCommand, ActivateEntitlementHandler};
use crate::domain::membership::{MembershipError, PaymentReference};
use crate::domain::payment::MinorUnits;
use crate::domain::settlement::{Purchase, Purchaser};
use crate::ports::{ActivationResult, Clock, OrderRepository, PurchaseRepository};

/// What happened to the entitlement on this attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementOutcome {
    /// This call activated the membership.
    Granted,
    /// An earlier call already activated it.
    AlreadyGranted,
    /// Not activated yet; the sweep will retry.
    Pending,
    /// The payment does not buy the requested plan. Left pending and logged.
    Rejected,
}

impl EntitlementOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementOutcome::Granted => "granted",
            EntitlementOutcome::AlreadyGranted => "already_granted",
            EntitlementOutcome::Pending => "pending",
            EntitlementOutcome::Rejected => "rejected",
        }
    }
}

pub struct EntitlementGranter {
    purchases: Arc<dyn PurchaseRepository>,
    orders: Arc<dyn OrderRepository>,
    activator: Arc<ActivateEntitlementHandler>,
    clock: Arc<dyn Clock>,
}

impl EntitlementGranter {
    pub fn new(
        purchases: Arc<dyn PurchaseRepository>,
        orders: Arc<dyn OrderRepository>,
        activator: Arc<ActivateEntitlementHandler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            purchases,
            orders,
            activator,
            clock,
        }
    }

    /// Never fails: problems leave the purchase pending and are logged.
    pub async fn grant(&self, purchase: &Purchase, purchaser: &Purchaser) -> EntitlementOutcome {
        let Some(amount_paid) = self.amount_paid(purchase).await else {
            tracing::warn!(
                payment_id = %purchase.payment_id,
                order_id = %purchase.order_id,
                "Amount paid unknown, entitlement left pending"
            );
            return EntitlementOutcome::Pending;
        };

        let cmd = ActivateEntitlementCommand {
            purchaser: purchaser.clone(),
            payment: PaymentReference {
                payment_id: purchase.payment_id.clone(),
                order_id: purchase.order_id.clone(),
                method: purchase.method.clone(),
                verified: true,
            },
            amount_paid,
        };

        let outcome = match self.activator.handle(cmd).await {
            Ok(ActivationResult::Activated) => EntitlementOutcome::Granted,
            Ok(ActivationResult::AlreadyActivated) => EntitlementOutcome::AlreadyGranted,
            Err(e @ (MembershipError::UnknownPlan(_) | MembershipError::PaymentMismatch { .. })) => {
                tracing::error!(
                    payment_id = %purchase.payment_id,
                    user_id = %purchaser.user_id,
                    plan_id = %purchaser.plan_id,
                    amount_paid = amount_paid.value(),
                    error = %e,
                    "Payment does not buy the requested plan"
                );
                return EntitlementOutcome::Rejected;
            }
            Err(e) => {
                tracing::error!(
                    payment_id = %purchase.payment_id,
                    user_id = %purchaser.user_id,
                    error = %e,
                    "Membership activation failed, entitlement left pending"
                );
                return EntitlementOutcome::Pending;
            }
        };

        if let Err(e) = self
            .purchases
            .mark_entitlement_granted(&purchase.payment_id, purchaser, self.clock.now())
            .await
        {
            tracing::error!(
                payment_id = %purchase.payment_id,
                error = %e,
                "Membership active but purchase still pending, sweep will finish it"
            );
        }

        outcome
    }

    async fn amount_paid(&self, purchase: &Purchase) -> Option<MinorUnits> {
        if let Some(amount) = purchase.reported_amount() {
            return Some(amount);
        }

        match self.orders.find_by_id(&purchase.order_id).await {
            Ok(order) => order.map(|o| o.amount),
            Err(e) => {
                tracing::warn!(order_id = %purchase.order_id, error = %e, "Order cache lookup failed");
                None
            }
        }
    }
}
