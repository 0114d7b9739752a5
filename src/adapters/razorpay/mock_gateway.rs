//! Mock payment gateway for testing.
//!
//! Supports:
//! - Pre-configured order responses
//! - Error injection
//! - Call tracking

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{CreateOrderRequest, GatewayError, GatewayOrder, PaymentGateway};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
/// mock.set_error(GatewayError::timeout("slow"));
/// let result = mock.create_order(request).await;
/// assert_eq!(mock.call_count(), 1);
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    next_order_id: Option<String>,
    next_error: Option<GatewayError>,
    requests: Vec<CreateOrderRequest>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the gateway order id returned by the next call.
    pub fn set_next_order_id(&self, id: impl Into<String>) {
        self.state().next_order_id = Some(id.into());
    }

    /// Set an error to return on the next call (consumed).
    pub fn set_error(&self, error: GatewayError) {
        self.state().next_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn requests(&self) -> Vec<CreateOrderRequest> {
        self.state().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let id = state.next_order_id.take().unwrap_or_else(|| {
            format!("order_mock_{}", uuid::Uuid::new_v4().simple())
        });

        Ok(GatewayOrder {
            id,
            amount: request.amount.value(),
            currency: request.currency.as_str().to_string(),
            receipt: Some(request.receipt.as_str().to_string()),
            status: "created".to_string(),
        })
    }
}
