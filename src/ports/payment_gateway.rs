//! Payment gateway port for creating orders with Razorpay.
//!
//! This system only creates orders. Checkout, capture and signing all happen
//! on the gateway side; their results come back through the checkout
//! callback and webhooks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::{Currency, MinorUnits, OrderNotes, Receipt};

/// Port for the external payment gateway.
///
/// Implementations must bound every outbound call with a timeout and must
/// not retry order creation.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order (payment intent) for the given amount.
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, GatewayError>;
}

/// Order creation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in minor units.
    pub amount: MinorUnits,
    pub currency: Currency,
    pub receipt: Receipt,
    /// Purchaser context echoed back on the payment entity.
    pub notes: OrderNotes,
}

/// Order as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Gateway's own error code, when it sent one.
    pub provider_code: Option<String>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Rejected, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NotConfigured, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let code = match err.code {
            GatewayErrorCode::NotConfigured => ErrorCode::ConfigurationError,
            _ => ErrorCode::UpstreamError,
        };
        DomainError::new(code, err.message)
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// The gateway did not answer within the configured timeout.
    Timeout,

    /// API key or secret rejected.
    AuthenticationError,

    /// Request rejected by the gateway (4xx).
    Rejected,

    /// Response body could not be understood.
    InvalidResponse,

    /// Credentials are not configured locally.
    NotConfigured,
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::Timeout => "timeout",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::Rejected => "rejected",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::NotConfigured => "not_configured",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::timeout("no response after 10s");
        assert_eq!(err.to_string(), "timeout: no response after 10s");
    }

    #[test]
    fn gateway_error_converts_to_domain_error() {
        let domain: DomainError = GatewayError::rejected("amount too small").into();
        assert_eq!(domain.code, ErrorCode::UpstreamError);

        let domain: DomainError = GatewayError::not_configured("key id missing").into();
        assert_eq!(domain.code, ErrorCode::ConfigurationError);
    }
}
