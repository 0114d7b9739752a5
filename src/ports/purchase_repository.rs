//! Purchase repository port - the settlement idempotency store.
//!
//! ## Why two callers can race here
//!
//! The checkout callback and the webhook report the same payment
//! independently and in either order, and the gateway redelivers webhooks.
//! Implementations must use a uniqueness constraint on `payment_id`
//! (`INSERT ... ON CONFLICT DO NOTHING`) so exactly one caller sees
//! `Inserted`.
//!
//! Activation itself is deduplicated by the membership ledger. The flag here
//! flips `pending → granted` only after the ledger entry commits, so a crash
//! in between leaves the purchase pending and the sweep finishes the job.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, Timestamp};
use crate::domain::settlement::{Purchase, Purchaser};

/// Result of attempting to record a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first report of this payment).
    Inserted,
    /// Record already exists (duplicate report).
    AlreadyExists,
}

/// Result of flipping a purchase's entitlement flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// This caller moved the entitlement from pending to granted.
    Claimed,
    /// Already granted, or the purchase is unknown.
    NotClaimed,
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Records a purchase unless one exists for the same payment id.
    async fn insert_if_absent(&self, purchase: &Purchase) -> Result<SaveResult, DomainError>;

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Purchase>, DomainError>;

    /// Atomically moves entitlement `pending → granted` and records the
    /// purchaser. Only one concurrent caller can receive `Claimed`.
    ///
    /// Call only after the membership activation has committed.
    async fn mark_entitlement_granted(
        &self,
        payment_id: &PaymentId,
        purchaser: &Purchaser,
        now: Timestamp,
    ) -> Result<ClaimResult, DomainError>;

    /// Notes a sweep pass that left the entitlement pending.
    async fn record_sweep_attempt(
        &self,
        payment_id: &PaymentId,
        now: Timestamp,
    ) -> Result<(), DomainError>;

    /// Purchases whose entitlement is still pending.
    ///
    /// Never-swept purchases come first, then the least recently swept, so
    /// rows that cannot resolve do not crowd out newer ones.
    async fn list_pending(&self, limit: u32) -> Result<Vec<Purchase>, DomainError>;
}
