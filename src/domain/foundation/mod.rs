//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, authentication types and the error
//! vocabulary shared by the booking, payment, settlement and membership
//! domains.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{BookingId, OrderId, PaymentId, PlanId, TrainerId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
