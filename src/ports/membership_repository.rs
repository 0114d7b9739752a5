//! Membership repository port.
//!
//! # Design
//!
//! - **One current membership per user**: `save_activation` overwrites it
//! - **Append-only ledger**: every activation adds one entry, unique per
//!   payment id
//! - Both writes happen together or not at all
//! - A payment already in the ledger changes nothing

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::membership::{LedgerEntry, Membership};

/// Result of saving an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationResult {
    /// Ledger entry appended and current membership replaced.
    Activated,
    /// The payment is already in the ledger; nothing was written.
    AlreadyActivated,
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Appends a ledger entry and replaces the user's current membership,
    /// unless the entry's payment id is already in the ledger.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure; neither write is kept
    async fn save_activation(
        &self,
        membership: &Membership,
        entry: &LedgerEntry,
    ) -> Result<ActivationResult, DomainError>;

    /// Find the user's current membership.
    ///
    /// Returns `None` if the user never activated a plan.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Membership>, DomainError>;

    /// Activation history for a user, oldest first.
    async fn ledger_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>, DomainError>;
}
