//! Settlement-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};

/// Errors raised by the settlement reconciler.
///
/// Only a failure to record the purchase is surfaced. Entitlement failures
/// after the purchase is recorded leave it pending for the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Could not record payment {payment_id}: {message}")]
    Persistence {
        payment_id: PaymentId,
        message: String,
    },

    #[error("Settlement store unavailable: {0}")]
    Unavailable(String),
}

impl SettlementError {
    pub fn persistence(payment_id: PaymentId, err: impl std::fmt::Display) -> Self {
        SettlementError::Persistence {
            payment_id,
            message: err.to_string(),
        }
    }

    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        SettlementError::Unavailable(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::DatabaseError
    }
}

impl From<SettlementError> for DomainError {
    fn from(err: SettlementError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
