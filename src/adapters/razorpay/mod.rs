//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port, which covers order creation only.
//! Signature checks for checkout callbacks and webhooks live in the domain
//! (`SignatureVerifier`) since they need nothing but the key secret.
//!
//! # Configuration
//!
//! - `RAZORPAY_KEY_ID`: API key id (rzp_live_... or rzp_test_...)
//! - `RAZORPAY_KEY_SECRET`: API key secret, also used for checkout signatures
//! - `RAZORPAY_WEBHOOK_SECRET`: webhook signing secret

mod mock_gateway;
mod razorpay_adapter;
mod unconfigured;

pub use mock_gateway::MockPaymentGateway;
pub use razorpay_adapter::{RazorpayConfig, RazorpayGatewayAdapter};
pub use unconfigured::UnconfiguredGateway;
