//! ListBookingsHandler - Query handler for a user's bookings.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::UserId;
use crate::ports::BookingRepository;

/// Query for all bookings of one user.
#[derive(Debug, Clone)]
pub struct ListBookingsQuery {
    pub user_id: UserId,
}

pub struct ListBookingsHandler {
    repository: Arc<dyn BookingRepository>,
}

impl ListBookingsHandler {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }

    /// Returns bookings ordered by session start.
    pub async fn handle(&self, query: ListBookingsQuery) -> Result<Vec<Booking>, BookingError> {
        Ok(self.repository.list_for_user(&query.user_id).await?)
    }
}
