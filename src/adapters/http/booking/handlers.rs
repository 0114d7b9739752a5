//! HTTP handlers for booking endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::{json_rejection, ErrorResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::application::{
    CancelBookingCommand, CancelBookingHandler, ListBookingsHandler, ListBookingsQuery,
    ProposeBookingCommand, ProposeBookingHandler,
};
use crate::domain::booking::{BookingError, BookingPolicy, SessionCategory};
use crate::domain::foundation::{BookingId, PlanId, Timestamp, TrainerId, ValidationError};
use crate::ports::{BookingRepository, Clock};

use super::dto::{BookingListResponse, BookingResponse, CancelBookingResponse, ProposeBookingRequest};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct BookingAppState {
    pub repository: Arc<dyn BookingRepository>,
    pub clock: Arc<dyn Clock>,
    pub policy: BookingPolicy,
}

impl BookingAppState {
    pub fn propose_handler(&self) -> ProposeBookingHandler {
        ProposeBookingHandler::new(self.repository.clone(), self.clock.clone(), self.policy)
    }

    pub fn cancel_handler(&self) -> CancelBookingHandler {
        CancelBookingHandler::new(self.repository.clone(), self.clock.clone(), self.policy)
    }

    pub fn list_handler(&self) -> ListBookingsHandler {
        ListBookingsHandler::new(self.repository.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /bookings
pub async fn propose_booking(
    State(state): State<BookingAppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<ProposeBookingRequest>, JsonRejection>,
) -> Result<Response, BookingApiError> {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return Ok(json_rejection(rejection)),
    };

    let cmd = ProposeBookingCommand {
        user_id: user.id,
        trainer_id: TrainerId::new(required(request.trainer_id, "trainerId")?)?,
        plan_id: PlanId::new(required(request.plan_id, "planId")?)?,
        category: required(request.category, "category")?.parse::<SessionCategory>()?,
        session_at: Timestamp::parse_rfc3339("sessionAt", &required(request.session_at, "sessionAt")?)?,
    };

    let booking = state.propose_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))).into_response())
}

/// GET /bookings
pub async fn list_bookings(
    State(state): State<BookingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BookingApiError> {
    let bookings = state
        .list_handler()
        .handle(ListBookingsQuery { user_id: user.id })
        .await?;

    Ok(Json(BookingListResponse {
        bookings: bookings.into_iter().map(BookingResponse::from).collect(),
    }))
}

/// POST /bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<BookingAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BookingApiError> {
    // An id that does not parse cannot name a stored booking
    let booking_id = id
        .parse::<BookingId>()
        .map_err(|_| BookingError::NotFound(BookingId::from_uuid(uuid::Uuid::nil())))?;

    let result = state
        .cancel_handler()
        .handle(CancelBookingCommand {
            booking_id,
            user_id: user.id,
        })
        .await?;

    Ok(Json(CancelBookingResponse::from(result)))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ValidationError::empty_field(field))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts booking errors to HTTP responses.
#[derive(Debug)]
pub struct BookingApiError(BookingError);

impl From<BookingError> for BookingApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for BookingApiError {
    fn from(err: ValidationError) -> Self {
        Self(BookingError::Validation(err))
    }
}

impl IntoResponse for BookingApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BookingError::Validation(_) | BookingError::LeadTime { .. } => StatusCode::BAD_REQUEST,
            BookingError::SlotTaken { .. } => StatusCode::CONFLICT,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Infrastructure(msg) => {
                tracing::error!(error = %msg, "Booking request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self.0 {
            BookingError::Infrastructure(_) => "Internal server error".to_string(),
            BookingError::NotFound(_) => "Booking not found".to_string(),
            other => other.to_string(),
        };

        ErrorResponse::new(self.0.code().to_string(), message).into_response_with(status)
    }
}
