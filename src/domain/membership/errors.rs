//! Membership-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId};

/// Errors raised while activating or reading memberships.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// The plan referenced by a purchase is not in the catalog.
    #[error("Unknown plan: {0}")]
    UnknownPlan(PlanId),

    /// The amount paid does not buy the plan.
    #[error("Payment of {paid} does not match plan {plan_id} priced {expected}")]
    PaymentMismatch {
        plan_id: PlanId,
        expected: i64,
        paid: i64,
    },

    /// Store failure.
    #[error("Membership store error: {0}")]
    Persistence(String),
}

impl MembershipError {
    pub fn persistence(message: impl Into<String>) -> Self {
        MembershipError::Persistence(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MembershipError::UnknownPlan(_) => ErrorCode::PlanNotFound,
            MembershipError::PaymentMismatch { .. } => ErrorCode::ValidationFailed,
            MembershipError::Persistence(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for MembershipError {
    fn from(err: DomainError) -> Self {
        MembershipError::Persistence(err.to_string())
    }
}
