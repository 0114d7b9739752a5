//! Settlement handlers.
//!
//! ## Commands
//! - Settling a verified payment report (callback or webhook)
//! - Reconciling entitlements left pending
//!
//! Both share `EntitlementGranter`, which owns the claim-then-activate step.

mod grant_entitlement;
mod reconcile_pending;
mod settle_payment;

pub use grant_entitlement::{EntitlementGranter, EntitlementOutcome};
pub use reconcile_pending::{ReconcilePendingCommand, ReconcilePendingHandler, ReconcileResult};
pub use settle_payment::{SettlePaymentCommand, SettlePaymentHandler, SettleResult, SettlementOutcome};
