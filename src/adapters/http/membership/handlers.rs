//! HTTP handlers for membership endpoints.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::{GetMembershipHandler, GetMembershipQuery};
use crate::domain::membership::MembershipError;
use crate::ports::{Clock, MembershipRepository};

use super::dto::{MembershipResponse, MembershipViewResponse};

#[derive(Clone)]
pub struct MembershipAppState {
    pub memberships: Arc<dyn MembershipRepository>,
    pub clock: Arc<dyn Clock>,
}

impl MembershipAppState {
    pub fn get_membership_handler(&self) -> GetMembershipHandler {
        GetMembershipHandler::new(self.memberships.clone())
    }
}

/// GET /membership
pub async fn get_membership(
    State(state): State<MembershipAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, MembershipApiError> {
    let membership = state
        .get_membership_handler()
        .handle(GetMembershipQuery { user_id: user.id })
        .await?;

    let now = state.clock.now();
    Ok(Json(MembershipResponse {
        membership: membership.map(|m| MembershipViewResponse::at(m, now)),
    }))
}

/// API error type that converts membership errors to HTTP responses.
#[derive(Debug)]
pub struct MembershipApiError(MembershipError);

impl From<MembershipError> for MembershipApiError {
    fn from(err: MembershipError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MembershipApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            MembershipError::UnknownPlan(_) | MembershipError::PaymentMismatch { .. } => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            MembershipError::Persistence(msg) => {
                tracing::error!(error = %msg, "Membership lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        ErrorResponse::new(self.0.code().to_string(), message).into_response_with(status)
    }
}
