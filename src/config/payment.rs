//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment configuration (Razorpay)
///
/// Secrets may be absent at load time. Requests that need a missing one
/// fail with a configuration error instead of the server refusing to start.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Razorpay API key id
    pub razorpay_key_id: Option<String>,

    /// Razorpay API key secret, also signs checkout callbacks
    pub razorpay_key_secret: Option<SecretString>,

    /// Webhook signing secret
    pub razorpay_webhook_secret: Option<SecretString>,

    /// Razorpay API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Order creation timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,

    /// Currency used when a request names none
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Echo expected/received signatures in mismatch responses
    #[serde(default)]
    pub expose_signature_debug: bool,
}

fn non_blank(secret: &Option<SecretString>) -> Option<&str> {
    secret
        .as_ref()
        .map(|s| s.expose_secret().as_str())
        .filter(|s| !s.trim().is_empty())
}

impl PaymentConfig {
    pub fn key_id(&self) -> Option<&str> {
        self.razorpay_key_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn key_secret(&self) -> Option<&str> {
        non_blank(&self.razorpay_key_secret)
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        non_blank(&self.razorpay_webhook_secret)
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    /// Check if using Razorpay test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id().is_some_and(|k| k.starts_with("rzp_test_"))
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key_id) = self.key_id() {
            if !key_id.starts_with("rzp_") {
                return Err(ValidationError::InvalidRazorpayKeyId);
            }
        }

        let currency = self.default_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }

        if self.gateway_timeout_secs == 0 || self.gateway_timeout_secs > 60 {
            return Err(ValidationError::InvalidGatewayTimeout);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            razorpay_key_id: None,
            razorpay_key_secret: None,
            razorpay_webhook_secret: None,
            api_base_url: default_api_base_url(),
            gateway_timeout_secs: default_gateway_timeout(),
            default_currency: default_currency(),
            expose_signature_debug: false,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

fn default_gateway_timeout() -> u64 {
    10
}

fn default_currency() -> String {
    "INR".to_string()
}
