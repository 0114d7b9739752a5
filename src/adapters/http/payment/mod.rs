//! HTTP adapter for payment endpoints.
//!
//! - `POST /payments/order` - Create a gateway order for checkout
//! - `POST /payments/verify` - Verify the checkout callback and settle
//! - `POST /payments/webhook` - Receive signed gateway events

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{PaymentApiError, PaymentAppState, SIGNATURE_HEADER};
pub use routes::payment_routes;
