//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Repository Ports
//!
//! - `BookingRepository` - Atomic check-and-insert per trainer
//! - `OrderRepository` - Local cache of gateway orders
//! - `PurchaseRepository` - Settlement idempotency and entitlement claim
//! - `MembershipRepository` - Current membership and activation ledger
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Razorpay order creation
//! - `SessionValidator` - Bearer token validation
//! - `Clock` - Current time

mod booking_repository;
mod clock;
mod membership_repository;
mod order_repository;
mod payment_gateway;
mod purchase_repository;
mod session_validator;

pub use booking_repository::{BookingRepository, FinalizeResult, ReserveOutcome};
pub use clock::Clock;
pub use membership_repository::{ActivationResult, MembershipRepository};
pub use order_repository::OrderRepository;
pub use payment_gateway::{
    CreateOrderRequest, GatewayError, GatewayErrorCode, GatewayOrder, PaymentGateway,
};
pub use purchase_repository::{ClaimResult, PurchaseRepository, SaveResult};
pub use session_validator::SessionValidator;
