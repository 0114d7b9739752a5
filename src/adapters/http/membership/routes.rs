//! Axum router configuration for membership endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_membership, MembershipAppState};

pub fn membership_routes() -> Router<MembershipAppState> {
    Router::new().route("/membership", get(get_membership))
}
