//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | MissingField | 400 |
//! | UnknownPlan | 400 |
//! | PlanPriceMismatch | 400 |
//! | SignatureMismatch | 400 |
//! | NotConfigured | 500 |
//! | Upstream | 500 |
//! | Persistence | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, ValidationError};

use super::SignatureMismatch;

/// Errors raised by order creation, checkout verification and webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown plan: {0}")]
    UnknownPlan(PlanId),

    #[error("Amount {actual} does not match price {expected} of plan {plan_id}")]
    PlanPriceMismatch {
        plan_id: PlanId,
        expected: i64,
        actual: i64,
    },

    #[error(transparent)]
    SignatureMismatch(#[from] SignatureMismatch),

    /// A required secret or credential is not configured.
    #[error("Payment configuration missing: {0}")]
    NotConfigured(&'static str),

    /// The gateway failed, timed out or returned an unusable response.
    #[error("Payment gateway error: {0}")]
    Upstream(String),

    /// The payment was accepted but could not be recorded.
    #[error("Payment persistence failed: {0}")]
    Persistence(String),
}

impl PaymentError {
    pub fn upstream(message: impl Into<String>) -> Self {
        PaymentError::Upstream(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        PaymentError::Persistence(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::Validation(_)
            | PaymentError::MissingField(_)
            | PaymentError::PlanPriceMismatch { .. } => ErrorCode::ValidationFailed,
            PaymentError::UnknownPlan(_) => ErrorCode::PlanNotFound,
            PaymentError::SignatureMismatch(_) => ErrorCode::SignatureMismatch,
            PaymentError::NotConfigured(_) => ErrorCode::ConfigurationError,
            PaymentError::Upstream(_) => ErrorCode::UpstreamError,
            PaymentError::Persistence(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
