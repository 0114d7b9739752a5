//! Request and response bodies for booking endpoints.

use serde::{Deserialize, Serialize};

use crate::application::CancelBookingResult;
use crate::domain::booking::Booking;

/// Body of `POST /bookings`.
///
/// Fields are optional so that a missing one is reported as a validation
/// error naming the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeBookingRequest {
    pub category: Option<String>,
    pub plan_id: Option<String>,
    pub trainer_id: Option<String>,
    pub session_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub user_id: String,
    pub trainer_id: String,
    pub plan_id: String,
    pub category: String,
    pub session_at: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id.to_string(),
            user_id: b.user_id.to_string(),
            trainer_id: b.trainer_id.to_string(),
            plan_id: b.plan_id.to_string(),
            category: b.category.as_str().to_string(),
            session_at: b.session_at.to_rfc3339(),
            status: b.status.as_str().to_string(),
            created_at: b.created_at.to_rfc3339(),
            updated_at: b.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelBookingResponse {
    pub outcome: &'static str,
    pub booking: BookingResponse,
}

impl From<CancelBookingResult> for CancelBookingResponse {
    fn from(result: CancelBookingResult) -> Self {
        Self {
            outcome: result.outcome.as_str(),
            booking: result.booking.into(),
        }
    }
}
