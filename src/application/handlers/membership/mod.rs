//! Membership handlers.

mod activate_entitlement;
mod get_membership;

pub use activate_entitlement::{ActivateEntitlementCommand, ActivateEntitlementHandler};
pub use get_membership::{GetMembershipHandler, GetMembershipQuery};
