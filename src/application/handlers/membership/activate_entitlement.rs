//! ActivateEntitlementHandler - Activates the membership a payment bought.
//!
//! The amount paid must match the plan's price. Replays of a payment already
//! in the ledger are absorbed by the store and reported as
//! `AlreadyActivated`.

use std::sync::Arc;

use crate::domain::membership::{LedgerEntry, Membership, MembershipError, PaymentReference, PlanCatalog};
use crate::domain::payment::MinorUnits;
use crate::domain::settlement::Purchaser;
use crate::ports::{ActivationResult, Clock, MembershipRepository};

#[derive(Debug, Clone)]
pub struct ActivateEntitlementCommand {
    pub purchaser: Purchaser,
    pub payment: PaymentReference,
    pub amount_paid: MinorUnits,
}

pub struct ActivateEntitlementHandler {
    memberships: Arc<dyn MembershipRepository>,
    catalog: Arc<PlanCatalog>,
    clock: Arc<dyn Clock>,
}

impl ActivateEntitlementHandler {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        catalog: Arc<PlanCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            memberships,
            catalog,
            clock,
        }
    }

    pub async fn handle(&self, cmd: ActivateEntitlementCommand) -> Result<ActivationResult, MembershipError> {
        let plan = self
            .catalog
            .get(&cmd.purchaser.plan_id)
            .ok_or_else(|| MembershipError::UnknownPlan(cmd.purchaser.plan_id.clone()))?;

        if !plan.is_paid_by(cmd.amount_paid) {
            return Err(MembershipError::PaymentMismatch {
                plan_id: plan.id.clone(),
                expected: plan.price_minor(),
                paid: cmd.amount_paid.value(),
            });
        }

        let membership = Membership::activate(cmd.purchaser.user_id, plan, cmd.payment, self.clock.now());
        let entry = LedgerEntry::for_activation(&membership);
        let result = self.memberships.save_activation(&membership, &entry).await?;

        match result {
            ActivationResult::Activated => tracing::info!(
                user_id = %membership.user_id,
                plan_id = %membership.plan_id,
                payment_id = %membership.payment.payment_id,
                expires_at = %membership.expires_at.to_rfc3339(),
                "Membership activated"
            ),
            ActivationResult::AlreadyActivated => tracing::debug!(
                payment_id = %membership.payment.payment_id,
                "Payment already activated"
            ),
        }

        Ok(result)
    }
}
