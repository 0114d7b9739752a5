//! Membership domain module.
//!
//! Plan catalog, the user's current membership window and the activation
//! ledger.
//!
//! # Module Structure
//!
//! - `plan` - Plan and PlanCatalog
//! - `aggregate` - Membership aggregate and PaymentReference
//! - `ledger` - LedgerEntry, one per activation
//! - `errors` - MembershipError

mod aggregate;
mod errors;
mod ledger;
mod plan;

pub use aggregate::{Membership, PaymentReference};
pub use errors::MembershipError;
pub use ledger::LedgerEntry;
pub use plan::{Plan, PlanCatalog};
