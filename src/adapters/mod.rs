//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - Bearer token validators (HS256 JWT, mock)
//! - `clock` - System and fixed clocks
//! - `http` - axum routers, handlers and middleware
//! - `memory` - In-memory repositories (memory mode and tests)
//! - `postgres` - PostgreSQL repositories
//! - `razorpay` - Razorpay Orders API client and a mock gateway

pub mod auth;
pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod razorpay;

pub use clock::{FixedClock, SystemClock};
