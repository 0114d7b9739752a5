//! Boxercise - session booking and payment settlement backend
//!
//! Members book one-on-one sessions with trainers and buy membership plans
//! through Razorpay. Checkout callbacks and webhooks settle each payment
//! exactly once and activate the purchased plan.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
