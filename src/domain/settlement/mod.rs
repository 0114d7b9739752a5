//! Settlement domain module.
//!
//! Merges the checkout callback and the webhook into one idempotent
//! purchase record per payment id.

mod errors;
mod purchase;

pub use errors::SettlementError;
pub use purchase::{
    EntitlementState, PaymentReport, Purchase, Purchaser, SettlementSource,
};
