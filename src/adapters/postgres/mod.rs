//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresBookingRepository` - advisory-locked slot reservation
//! - `PostgresOrderRepository` - order cache with conditional paid transition
//! - `PostgresPurchaseRepository` - settlement records keyed by payment id
//! - `PostgresMembershipRepository` - current membership plus ledger

mod booking_repository;
mod membership_repository;
mod order_repository;
mod purchase_repository;

pub use booking_repository::PostgresBookingRepository;
pub use membership_repository::PostgresMembershipRepository;
pub use order_repository::PostgresOrderRepository;
pub use purchase_repository::PostgresPurchaseRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Maps a stored value that no longer parses into a database error.
fn invalid_column(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} in stored row: {}", column, err),
    )
}
