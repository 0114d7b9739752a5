//! Payment domain module.
//!
//! Orders (payment intents), amounts, Razorpay signature verification and
//! webhook envelope parsing.
//!
//! # Module Structure
//!
//! - `money` - MinorUnits and Currency
//! - `order` - Order entity, OrderStatus, Receipt
//! - `signature` - HMAC-SHA256 checkout and webhook verification
//! - `gateway_event` - Webhook envelope parsing
//! - `errors` - PaymentError

mod errors;
mod gateway_event;
mod money;
mod order;
mod signature;

pub use errors::PaymentError;
pub use gateway_event::{CapturedPayment, GatewayEvent, MalformedEvent, OrderNotes, PAYMENT_CAPTURED};
pub use money::{Currency, MinorUnits, DEFAULT_CURRENCY};
pub use order::{Order, OrderStatus, Receipt};
pub use signature::{SignatureMismatch, SignatureVerifier};
