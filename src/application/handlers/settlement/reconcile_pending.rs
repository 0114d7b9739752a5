//! ReconcilePendingHandler - Retries entitlements left pending.
//!
//! Run periodically. A purchase stays pending when its purchaser or amount
//! was unknown at settlement time, when activation failed, or when the flag
//! flip after activation failed. The sweep looks the purchaser up again from
//! the order cache and retries the grant.
//!
//! Every pass that leaves a purchase pending is recorded on it, which moves
//! it behind purchases not yet tried. A batch full of purchases that never
//! resolve therefore cannot hold back newer ones.

use std::sync::Arc;

use crate::domain::settlement::{Purchase, Purchaser, SettlementError};
use crate::ports::{Clock, OrderRepository, PurchaseRepository};

use super::{EntitlementGranter, EntitlementOutcome};

#[derive(Debug, Clone, Copy)]
pub struct ReconcilePendingCommand {
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    pub examined: usize,
    pub granted: usize,
    /// Purchaser still unknown.
    pub unresolved: usize,
    /// Grant attempted and left pending.
    pub failed: usize,
    /// Payment does not buy the plan.
    pub rejected: usize,
}

pub struct ReconcilePendingHandler {
    purchases: Arc<dyn PurchaseRepository>,
    orders: Arc<dyn OrderRepository>,
    granter: Arc<EntitlementGranter>,
    clock: Arc<dyn Clock>,
}

impl ReconcilePendingHandler {
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

    pub async fn handle(&self, cmd: ReconcilePendingCommand) -> Result<ReconcileResult, SettlementError> {
        let pending = self
            .purchases
            .list_pending(cmd.limit)
            .await
            .map_err(SettlementError::unavailable)?;

        let mut result = ReconcileResult::default();
        for purchase in &pending {
            result.examined += 1;

            let outcome = match self.resolve(purchase).await {
                Some(purchaser) => self.granter.grant(purchase, &purchaser).await,
                None => {
                    result.unresolved += 1;
                    self.record_attempt(purchase).await;
                    continue;
                }
            };

            match outcome {
                EntitlementOutcome::Granted => result.granted += 1,
                EntitlementOutcome::AlreadyGranted => {}
                EntitlementOutcome::Pending => {
                    result.failed += 1;
                    self.record_attempt(purchase).await;
                }
                EntitlementOutcome::Rejected => {
                    result.rejected += 1;
                    self.record_attempt(purchase).await;
                }
            }
        }

        if result.examined > 0 {
            tracing::info!(
                examined = result.examined,
                granted = result.granted,
                unresolved = result.unresolved,
                failed = result.failed,
                rejected = result.rejected,
                "Reconciled pending entitlements"
            );
        }

        Ok(result)
    }

    async fn resolve(&self, purchase: &Purchase) -> Option<Purchaser> {
        if let Some(purchaser) = purchase.purchaser() {
            return Some(purchaser);
        }

        let order = match self.orders.find_by_id(&purchase.order_id).await {
            Ok(order) => order?,
            Err(e) => {
                tracing::warn!(order_id = %purchase.order_id, error = %e, "Order cache lookup failed");
                return None;
            }
        };

        Purchaser::from_parts(
            order.user_id.or_else(|| purchase.user_id.clone()),
            order.plan_id.or_else(|| purchase.plan_id.clone()),
        )
    }

    async fn record_attempt(&self, purchase: &Purchase) {
        if let Err(e) = self
            .purchases
            .record_sweep_attempt(&purchase.payment_id, self.clock.now())
            .await
        {
            tracing::warn!(payment_id = %purchase.payment_id, error = %e, "Failed to record sweep attempt");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{InMemoryMembershipStore, InMemoryOrderStore, InMemoryPurchaseStore};
    use crate::application::handlers::membership::ActivateEntitlementHandler;
    use crate::domain::foundation::{OrderId, PaymentId, PlanId, Timestamp, UserId};
    use crate::domain::membership::PlanCatalog;
    use crate::domain::payment::{Currency, MinorUnits, Order, Receipt};
    use crate::domain::settlement::{PaymentReport, SettlementSource};
    use crate::ports::MembershipRepository;

    struct Fixture {
        purchases: Arc<InMemoryPurchaseStore>,
        orders: Arc<InMemoryOrderStore>,
        memberships: Arc<InMemoryMembershipStore>,
        clock: Arc<FixedClock>,
        handler: ReconcilePendingHandler,
    }

    fn base() -> Timestamp {
        Timestamp::parse_rfc3339("base", "2025-06-01T06:00:00Z").unwrap()
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::new(base().plus_hours(1)));
        let purchases = Arc::new(InMemoryPurchaseStore::new());
        let orders = Arc::new(InMemoryOrderStore::new());
        let memberships = Arc::new(InMemoryMembershipStore::new());
        let activator = Arc::new(ActivateEntitlementHandler::new(
            memberships.clone(),
            Arc::new(PlanCatalog::standard()),
            clock.clone(),
        ));
        let granter = Arc::new(EntitlementGranter::new(
            purchases.clone(),
            orders.clone(),
            activator,
            clock.clone(),
        ));
        let handler = ReconcilePendingHandler::new(purchases.clone(), orders.clone(), granter, clock.clone());
        Fixture {
            purchases,
            orders,
            memberships,
            clock,
            handler,
        }
    }

    async fn pending_purchase(f: &Fixture, payment: &str, order: &str, minutes_after_base: i64) {
        let purchase = Purchase::record(
            PaymentReport {
                payment_id: PaymentId::new(payment).unwrap(),
                order_id: OrderId::new(order).unwrap(),
                amount: None,
                currency: None,
                method: None,
                raw_payload: serde_json::json!({}),
                source: SettlementSource::Webhook,
            },
            None,
            base().plus_minutes(minutes_after_base),
        );
        f.purchases.insert_if_absent(&purchase).await.unwrap();
    }

    async fn cache_order(f: &Fixture, order: &str, user: &str, plan: &str) {
        let catalog = PlanCatalog::standard();
        let plan_id = PlanId::new(plan).unwrap();
        let price = catalog.get(&plan_id).map(|p| p.price_minor()).unwrap_or(100);
        let order = Order::created(
            OrderId::new(order).unwrap(),
            MinorUnits::new(price).unwrap(),
            Currency::inr(),
            Receipt::generate(base()),
            Some(UserId::new(user).unwrap()),
            Some(plan_id),
            base(),
        );
        f.orders.save(&order).await.unwrap();
    }

    fn sweep(limit: u32) -> ReconcilePendingCommand {
        ReconcilePendingCommand { limit }
    }

    #[tokio::test]
    async fn grants_purchases_whose_order_is_now_known() {
        let f = fixture();
        pending_purchase(&f, "pay_1", "order_1", 0).await;
        pending_purchase(&f, "pay_2", "order_2", 1).await;
        cache_order(&f, "order_1", "u1", "active").await;

        let result = f.handler.handle(sweep(10)).await.unwrap();

        assert_eq!(
            result,
            ReconcileResult {
                examined: 2,
                granted: 1,
                unresolved: 1,
                failed: 0,
                rejected: 0,
            }
        );
        assert_eq!(f.memberships.ledger_len().await, 1);
        assert_eq!(f.purchases.list_pending(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_sweep_does_not_regrant() {
        let f = fixture();
        pending_purchase(&f, "pay_1", "order_1", 0).await;
        cache_order(&f, "order_1", "u1", "lite").await;

        f.handler.handle(sweep(10)).await.unwrap();
        let second = f.handler.handle(sweep(10)).await.unwrap();

        assert_eq!(second.examined, 0);
        assert_eq!(f.memberships.ledger_len().await, 1);
    }

    #[tokio::test]
    async fn failed_activation_is_counted_and_retried_later() {
        let f = fixture();
        pending_purchase(&f, "pay_1", "order_1", 0).await;
        cache_order(&f, "order_1", "u1", "lite").await;
        f.memberships.set_fail_writes(true);

        let first = f.handler.handle(sweep(10)).await.unwrap();
        assert_eq!(first.failed, 1);

        f.memberships.set_fail_writes(false);
        let second = f.handler.handle(sweep(10)).await.unwrap();
        assert_eq!(second.granted, 1);
    }

    #[tokio::test]
    async fn unresolvable_backlog_does_not_starve_newer_purchases() {
        let f = fixture();
        for (i, payment) in ["orphan_1", "orphan_2", "orphan_3"].iter().enumerate() {
            pending_purchase(&f, payment, &format!("missing_{}", i), i as i64).await;
        }
        pending_purchase(&f, "pay_new", "order_new", 30).await;
        cache_order(&f, "order_new", "u1", "lite").await;

        let mut granted = 0;
        for tick in 0..4 {
            f.clock.set(base().plus_hours(1).plus_minutes(tick));
            granted += f.handler.handle(sweep(1)).await.unwrap().granted;
        }

        assert_eq!(granted, 1);
        let membership = f
            .memberships
            .find_by_user_id(&UserId::new("u1").unwrap())
            .await
            .unwrap();
        assert!(membership.is_some());
    }

    #[tokio::test]
    async fn unresolvable_purchases_rotate_through_the_batch() {
        let f = fixture();
        pending_purchase(&f, "orphan_1", "missing_1", 0).await;
        pending_purchase(&f, "orphan_2", "missing_2", 1).await;

        f.handler.handle(sweep(1)).await.unwrap();
        f.clock.set(base().plus_hours(2));
        f.handler.handle(sweep(1)).await.unwrap();

        let pending = f.purchases.list_pending(10).await.unwrap();
        assert!(pending.iter().all(|p| p.sweep_attempts == 1));
    }

    #[tokio::test]
    async fn underpaid_purchase_is_rejected_and_stays_pending() {
        let f = fixture();
        pending_purchase(&f, "pay_1", "order_1", 0).await;
        let order = Order::created(
            OrderId::new("order_1").unwrap(),
            MinorUnits::new(100).unwrap(),
            Currency::inr(),
            Receipt::generate(base()),
            Some(UserId::new("u1").unwrap()),
            Some(PlanId::new("elite").unwrap()),
            base(),
        );
        f.orders.save(&order).await.unwrap();

        let result = f.handler.handle(sweep(10)).await.unwrap();

        assert_eq!(result.rejected, 1);
        assert_eq!(f.memberships.ledger_len().await, 0);
        assert_eq!(f.purchases.list_pending(10).await.unwrap()[0].sweep_attempts, 1);
    }
}
