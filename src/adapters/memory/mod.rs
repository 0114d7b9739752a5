//! In-memory repository adapters.
//!
//! Used when no database URL is configured and throughout the tests.

mod booking_store;
mod membership_store;
mod order_store;
mod purchase_store;

pub use booking_store::InMemoryBookingStore;
pub use membership_store::InMemoryMembershipStore;
pub use order_store::InMemoryOrderStore;
pub use purchase_store::InMemoryPurchaseStore;
