//! HTTP adapter for membership endpoints.
//!
//! - `GET /membership` - The caller's current membership, or null

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{MembershipApiError, MembershipAppState};
pub use routes::membership_routes;
