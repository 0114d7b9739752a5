//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Razorpay Orders API.
//! Requests authenticate with HTTP basic auth using the key id and key
//! secret.
//!
//! # Configuration
//!
//! ```ignore
//! let config = RazorpayConfig::new(key_id, key_secret);
//! let adapter = RazorpayGatewayAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::payment::OrderNotes;
use crate::ports::{CreateOrderRequest, GatewayError, GatewayOrder, PaymentGateway};

const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    key_id: String,
    key_secret: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: SecretString::new(key_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Razorpay payment gateway adapter.
pub struct RazorpayGatewayAdapter {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayGatewayAdapter {
    pub fn new(config: RazorpayConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[derive(Debug, Serialize)]
struct OrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
    notes: &'a OrderNotes,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    receipt: Option<String>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn map_send_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::timeout(err.to_string())
    } else {
        GatewayError::network(err.to_string())
    }
}

fn map_error_response(status: reqwest::StatusCode, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<RazorpayErrorBody>(body).ok().map(|b| b.error);
    let description = detail
        .as_ref()
        .and_then(|d| d.description.clone())
        .unwrap_or_else(|| format!("Razorpay API error ({})", status.as_u16()));

    let err = if status == reqwest::StatusCode::UNAUTHORIZED {
        GatewayError::authentication(description)
    } else {
        GatewayError::rejected(description)
    };

    match detail.and_then(|d| d.code) {
        Some(code) => err.with_provider_code(code),
        None => err,
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGatewayAdapter {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.config.api_base_url);
        let body = OrderBody {
            amount: request.amount.value(),
            currency: request.currency.as_str(),
            receipt: request.receipt.as_str(),
            payment_capture: 1,
            notes: &request.notes,
        };

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                error = %error_text,
                "Razorpay create_order failed"
            );
            return Err(map_error_response(status, &error_text));
        }

        let order: RazorpayOrder = response.json().await.map_err(|e| {
            GatewayError::invalid_response(format!("Failed to parse Razorpay response: {}", e))
        })?;

        tracing::debug!(order_id = %order.id, amount = order.amount, "Razorpay order created");

        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
            status: order.status,
        })
    }
}
