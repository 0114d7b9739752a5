//! SettlePaymentHandler - Records a verified payment report exactly once.
//!
//! Both the checkout callback and the webhook end here. The first report for
//! a payment id creates the purchase; later reports find it and only retry
//! the entitlement if it is still pending.
//!
//! # Purchaser Resolution
//!
//! The order cache is authoritative for who bought which plan. Context carried
//! by the report (callback body or webhook notes) only fills halves the
//! cached order lacks.

use std::sync::Arc;

use crate::domain::foundation::{PlanId, UserId};
use crate::domain::settlement::{PaymentReport, Purchase, Purchaser, SettlementError};
use crate::ports::{Clock, OrderRepository, PurchaseRepository, SaveResult};

use super::{EntitlementGranter, EntitlementOutcome};

#[derive(Debug, Clone)]
pub struct SettlePaymentCommand {
    pub report: PaymentReport,
    pub user_id: Option<UserId>,
    pub plan_id: Option<PlanId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Created,
    AlreadySettled,
}

impl SettlementOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementOutcome::Created => "created",
            SettlementOutcome::AlreadySettled => "already_settled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleResult {
    pub outcome: SettlementOutcome,
    pub entitlement: EntitlementOutcome,
}

pub struct SettlePaymentHandler {
    purchases: Arc<dyn PurchaseRepository>,
    orders: Arc<dyn OrderRepository>,
    granter: Arc<EntitlementGranter>,
    clock: Arc<dyn Clock>,
}

impl SettlePaymentHandler {
    pub fn new(
        purchases: Arc<dyn PurchaseRepository>,
        orders: Arc<dyn OrderRepository>,
        granter: Arc<EntitlementGranter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            purchases,
            orders,
            granter,
            clock,
        }
    }

    pub async fn handle(&self, cmd: SettlePaymentCommand) -> Result<SettleResult, SettlementError> {
        let payment_id = cmd.report.payment_id.clone();
        let order_id = cmd.report.order_id.clone();
        let source = cmd.report.source;
        let reported_amount = cmd.report.amount;

        // 1. Resolve purchaser
        let purchaser = self.resolve_purchaser(&cmd).await;

        // 2. Insert-if-absent keyed by payment id
        let now = self.clock.now();
        let purchase = Purchase::record(cmd.report, purchaser.as_ref(), now);
        let saved = self
            .purchases
            .insert_if_absent(&purchase)
            .await
            .map_err(|e| SettlementError::persistence(payment_id.clone(), e))?;

        match saved {
            SaveResult::Inserted => {
                tracing::info!(
                    payment_id = %payment_id,
                    order_id = %order_id,
                    source = source.as_str(),
                    "Payment settled"
                );

                match self.orders.mark_paid(&order_id, &payment_id, now).await {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!(order_id = %order_id, "Order not cached or already paid"),
                    Err(e) => tracing::warn!(order_id = %order_id, error = %e, "Failed to mark order paid"),
                }

                let entitlement = self.grant_if_resolved(&purchase, purchaser.as_ref()).await;
                Ok(SettleResult {
                    outcome: SettlementOutcome::Created,
                    entitlement,
                })
            }
            SaveResult::AlreadyExists => {
                tracing::info!(
                    payment_id = %payment_id,
                    source = source.as_str(),
                    "Payment already settled"
                );

                let existing = self
                    .purchases
                    .find_by_payment_id(&payment_id)
                    .await
                    .map_err(|e| SettlementError::persistence(payment_id.clone(), e))?;

                let entitlement = match existing {
                    Some(mut existing) if existing.is_entitlement_pending() => {
                        let purchaser = existing.purchaser().or(purchaser);
                        // A callback-first record has no amount; a later webhook does.
                        existing.amount = existing.amount.or(reported_amount);
                        self.grant_if_resolved(&existing, purchaser.as_ref()).await
                    }
                    Some(_) => EntitlementOutcome::AlreadyGranted,
                    None => EntitlementOutcome::Pending,
                };

                Ok(SettleResult {
                    outcome: SettlementOutcome::AlreadySettled,
                    entitlement,
                })
            }
        }
    }

    async fn resolve_purchaser(&self, cmd: &SettlePaymentCommand) -> Option<Purchaser> {
        let order = match self.orders.find_by_id(&cmd.report.order_id).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(
                    order_id = %cmd.report.order_id,
                    error = %e,
                    "Order cache lookup failed"
                );
                None
            }
        };

        let (cached_user, cached_plan) = match order {
            Some(order) => (order.user_id, order.plan_id),
            None => (None, None),
        };

        Purchaser::from_parts(
            cached_user.or_else(|| cmd.user_id.clone()),
            cached_plan.or_else(|| cmd.plan_id.clone()),
        )
    }

    async fn grant_if_resolved(
        &self,
        purchase: &Purchase,
        purchaser: Option<&Purchaser>,
    ) -> EntitlementOutcome {
        match purchaser {
            Some(purchaser) => self.granter.grant(purchase, purchaser).await,
            None => {
                tracing::warn!(
                    payment_id = %purchase.payment_id,
                    order_id = %purchase.order_id,
                    "Purchaser unknown, entitlement left pending"
                );
                EntitlementOutcome::Pending
            }
        }
    }
}
