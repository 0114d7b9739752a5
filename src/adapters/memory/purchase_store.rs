//! In-memory purchase store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PaymentId, Timestamp};
use crate::domain::settlement::{EntitlementState, Purchase, Purchaser};
use crate::ports::{ClaimResult, PurchaseRepository, SaveResult};

#[derive(Debug, Clone, Default)]
pub struct InMemoryPurchaseStore {
    purchases: Arc<RwLock<HashMap<PaymentId, Purchase>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail (useful for tests).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.purchases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.purchases.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("purchase store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchaseStore {
    async fn insert_if_absent(&self, purchase: &Purchase) -> Result<SaveResult, DomainError> {
        self.check_writable()?;
        let mut purchases = self.purchases.write().await;
        if purchases.contains_key(&purchase.payment_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        purchases.insert(purchase.payment_id.clone(), purchase.clone());
        Ok(SaveResult::Inserted)
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Purchase>, DomainError> {
        Ok(self.purchases.read().await.get(payment_id).cloned())
    }

    async fn mark_entitlement_granted(
        &self,
        payment_id: &PaymentId,
        purchaser: &Purchaser,
        now: Timestamp,
    ) -> Result<ClaimResult, DomainError> {
        self.check_writable()?;
        let mut purchases = self.purchases.write().await;
        match purchases.get_mut(payment_id) {
            Some(p) if p.entitlement == EntitlementState::Pending => {
                p.entitlement = EntitlementState::Granted;
                p.entitlement_granted_at = Some(now);
                if p.user_id.is_none() {
                    p.user_id = Some(purchaser.user_id.clone());
                }
                if p.plan_id.is_none() {
                    p.plan_id = Some(purchaser.plan_id.clone());
                }
                Ok(ClaimResult::Claimed)
            }
            _ => Ok(ClaimResult::NotClaimed),
        }
    }

    async fn record_sweep_attempt(
        &self,
        payment_id: &PaymentId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        if let Some(p) = self.purchases.write().await.get_mut(payment_id) {
            p.sweep_attempts += 1;
            p.last_swept_at = Some(now);
        }
        Ok(())
    }

    async fn list_pending(&self, limit: u32) -> Result<Vec<Purchase>, DomainError> {
        let mut pending: Vec<Purchase> = self
            .purchases
            .read()
            .await
            .values()
            .filter(|p| p.is_entitlement_pending())
            .cloned()
            .collect();
        // `None` sorts before `Some`, so never-swept purchases lead.
        pending.sort_by_key(|p| (p.last_swept_at, p.created_at));
        pending.truncate(limit as usize);
        Ok(pending)
    }
}
