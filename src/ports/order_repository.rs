//! Order cache port.
//!
//! Local record of gateway orders, keyed by gateway order id. The webhook
//! path uses it to find who placed an order and for which plan.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, Timestamp};
use crate::domain::payment::Order;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a newly created order. Re-saving the same id is a no-op.
    async fn save(&self, order: &Order) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Conditionally moves a created order to paid.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// order was unknown or already paid.
    async fn mark_paid(
        &self,
        id: &OrderId,
        payment_id: &PaymentId,
        now: Timestamp,
    ) -> Result<bool, DomainError>;
}
