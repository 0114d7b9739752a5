//! In-memory membership store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::membership::{LedgerEntry, Membership};
use crate::ports::{ActivationResult, MembershipRepository};

#[derive(Debug, Default)]
struct State {
    current: HashMap<UserId, Membership>,
    ledger: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipStore {
    state: Arc<RwLock<State>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail (useful for tests).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Total ledger entries across all users.
    pub async fn ledger_len(&self) -> usize {
        self.state.read().await.ledger.len()
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipStore {
    async fn save_activation(
        &self,
        membership: &Membership,
        entry: &LedgerEntry,
    ) -> Result<ActivationResult, DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("membership store unavailable"));
        }
        let mut state = self.state.write().await;
        if state.ledger.iter().any(|e| e.payment_id == entry.payment_id) {
            return Ok(ActivationResult::AlreadyActivated);
        }
        state.ledger.push(entry.clone());
        state
            .current
            .insert(membership.user_id.clone(), membership.clone());
        Ok(ActivationResult::Activated)
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Membership>, DomainError> {
        Ok(self.state.read().await.current.get(user_id).cloned())
    }

    async fn ledger_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .ledger
            .iter()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect())
    }
}
