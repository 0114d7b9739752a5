//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `booking` - Session reservations, lead time and conflict window
//! - `payment` - Orders, amounts, signatures and webhook envelopes
//! - `settlement` - Idempotent purchase records and entitlement state
//! - `membership` - Plan catalog, membership windows and ledger

pub mod booking;
pub mod foundation;
pub mod membership;
pub mod payment;
pub mod settlement;
