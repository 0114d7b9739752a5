//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod booking;
pub mod membership;
pub mod payment;
pub mod settlement;
