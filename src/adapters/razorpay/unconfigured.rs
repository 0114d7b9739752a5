//! Gateway used when no Razorpay credentials are configured.

use async_trait::async_trait;

use crate::ports::{CreateOrderRequest, GatewayError, GatewayOrder, PaymentGateway};

/// Fails every order with `NotConfigured`, so order creation reports a
/// configuration error instead of reaching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredGateway {
    async fn create_order(&self, _request: CreateOrderRequest) -> Result<GatewayOrder, GatewayError> {
        Err(GatewayError::not_configured("Razorpay key id or key secret is not set"))
    }
}
