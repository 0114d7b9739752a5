//! Payment handlers.
//!
//! ## Commands
//! - Creating a gateway order
//! - Verifying the checkout callback
//! - Handling gateway webhooks

mod create_order;
mod handle_webhook;
mod verify_checkout;

pub use create_order::{CreateOrderCommand, CreateOrderHandler};
pub use handle_webhook::{HandleWebhookCommand, HandleWebhookHandler, WebhookOutcome};
pub use verify_checkout::{VerifyCheckoutCommand, VerifyCheckoutHandler};
