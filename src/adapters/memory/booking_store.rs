//! In-memory booking store.
//!
//! Holds one write lock across the conflict check and the insert, which
//! makes `insert_if_available` atomic within the process.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::foundation::{BookingId, DomainError, Timestamp, UserId};
use crate::ports::{BookingRepository, FinalizeResult, ReserveOutcome};

#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bookings (useful for tests).
    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingStore {
    async fn insert_if_available(
        &self,
        booking: &Booking,
        window: Duration,
    ) -> Result<ReserveOutcome, DomainError> {
        let mut bookings = self.bookings.write().await;

        let clash = bookings.values().find(|existing| {
            existing.trainer_id == booking.trainer_id
                && existing.status.occupies_slot()
                && existing.session_at.duration_since(&booking.session_at).abs() < window
        });
        if let Some(existing) = clash {
            return Ok(ReserveOutcome::Conflict {
                existing: existing.id,
            });
        }

        bookings.insert(booking.id, booking.clone());
        Ok(ReserveOutcome::Inserted)
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.bookings.read().await.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Booking>, DomainError> {
        let mut list: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| &b.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by_key(|b| b.session_at);
        Ok(list)
    }

    async fn finalize(
        &self,
        id: &BookingId,
        status: BookingStatus,
        now: Timestamp,
    ) -> Result<FinalizeResult, DomainError> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(id) {
            Some(booking) if booking.status == BookingStatus::Upcoming => {
                booking.status = status;
                booking.updated_at = now;
                Ok(FinalizeResult::Applied)
            }
            _ => Ok(FinalizeResult::NotUpcoming),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{BookingPolicy, SessionCategory};
    use crate::domain::foundation::{PlanId, TrainerId};

    fn now() -> Timestamp {
        Timestamp::parse_rfc3339("now", "2025-06-01T06:00:00Z").unwrap()
    }

    fn booking(user: &str, trainer: &str, session_at: Timestamp) -> Booking {
        Booking::propose(
            UserId::new(user).unwrap(),
            TrainerId::new(trainer).unwrap(),
            PlanId::new("lite").unwrap(),
            SessionCategory::HathaYoga,
            session_at,
            &BookingPolicy::default(),
            now(),
        )
        .unwrap()
    }

    fn window() -> Duration {
        Duration::minutes(45)
    }

    #[tokio::test]
    async fn overlapping_slot_for_same_trainer_conflicts() {
        let store = InMemoryBookingStore::new();
        let slot = now().plus_hours(24);
        let first = booking("u1", "t1", slot);

        assert_eq!(
            store.insert_if_available(&first, window()).await.unwrap(),
            ReserveOutcome::Inserted
        );
        let second = booking("u2", "t1", slot.plus_minutes(30));
        assert_eq!(
            store.insert_if_available(&second, window()).await.unwrap(),
            ReserveOutcome::Conflict { existing: first.id }
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn other_trainer_same_slot_is_fine() {
        let store = InMemoryBookingStore::new();
        let slot = now().plus_hours(24);
        store.insert_if_available(&booking("u1", "t1", slot), window()).await.unwrap();

        let outcome = store
            .insert_if_available(&booking("u1", "t2", slot), window())
            .await
            .unwrap();
        assert_eq!(outcome, ReserveOutcome::Inserted);
    }

    #[tokio::test]
    async fn cancelled_booking_frees_the_slot() {
        let store = InMemoryBookingStore::new();
        let slot = now().plus_hours(24);
        let first = booking("u1", "t1", slot);
        store.insert_if_available(&first, window()).await.unwrap();
        store.finalize(&first.id, BookingStatus::Cancelled, now()).await.unwrap();

        let outcome = store
            .insert_if_available(&booking("u2", "t1", slot), window())
            .await
            .unwrap();
        assert_eq!(outcome, ReserveOutcome::Inserted);
    }

    #[tokio::test]
    async fn finalize_is_conditional_on_upcoming() {
        let store = InMemoryBookingStore::new();
        let b = booking("u1", "t1", now().plus_hours(24));
        store.insert_if_available(&b, window()).await.unwrap();

        assert_eq!(
            store.finalize(&b.id, BookingStatus::Cancelled, now()).await.unwrap(),
            FinalizeResult::Applied
        );
        assert_eq!(
            store.finalize(&b.id, BookingStatus::Used, now()).await.unwrap(),
            FinalizeResult::NotUpcoming
        );
        let stored = store.find_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn list_for_user_is_sorted_by_session() {
        let store = InMemoryBookingStore::new();
        let late = booking("u1", "t1", now().plus_hours(48));
        let early = booking("u1", "t2", now().plus_hours(24));
        let other = booking("u2", "t3", now().plus_hours(30));
        for b in [&late, &early, &other] {
            store.insert_if_available(b, window()).await.unwrap();
        }

        let list = store.list_for_user(&UserId::new("u1").unwrap()).await.unwrap();
        let ids: Vec<BookingId> = list.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }
}
