//! In-memory order cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, Timestamp};
use crate::domain::payment::Order;
use crate::ports::OrderRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail (useful for tests).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("order store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn save(&self, order: &Order) -> Result<(), DomainError> {
        self.check_writable()?;
        self.orders
            .write()
            .await
            .entry(order.id.clone())
            .or_insert_with(|| order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn mark_paid(
        &self,
        id: &OrderId,
        payment_id: &PaymentId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut orders = self.orders.write().await;
        match orders.get_mut(id) {
            Some(order) => Ok(order.mark_paid(payment_id.clone(), now).is_ok()),
            None => Ok(false),
        }
    }
}
