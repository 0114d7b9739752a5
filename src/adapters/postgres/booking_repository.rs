//! PostgreSQL implementation of BookingRepository.
//!
//! The availability check and insert run in one transaction holding
//! `pg_advisory_xact_lock(hashtext(trainer_id))`, so two proposals for the
//! same trainer serialize while different trainers proceed in parallel.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus, SessionCategory};
use crate::domain::foundation::{
    BookingId, DomainError, PlanId, Timestamp, TrainerId, UserId,
};
use crate::ports::{BookingRepository, FinalizeResult, ReserveOutcome};

use super::invalid_column;

#[derive(Clone)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: String,
    trainer_id: String,
    plan_id: String,
    category: String,
    session_at: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DomainError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking::reconstitute(
            BookingId::from_uuid(row.id),
            UserId::new(row.user_id).map_err(|e| invalid_column("user_id", e))?,
            TrainerId::new(row.trainer_id).map_err(|e| invalid_column("trainer_id", e))?,
            PlanId::new(row.plan_id).map_err(|e| invalid_column("plan_id", e))?,
            row.category
                .parse::<SessionCategory>()
                .map_err(|e| invalid_column("category", e))?,
            Timestamp::from_datetime(row.session_at),
            row.status
                .parse::<BookingStatus>()
                .map_err(|e| invalid_column("status", e))?,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        ))
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, trainer_id, plan_id, category, session_at, status, created_at, updated_at
    FROM bookings
"#;

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn insert_if_available(
        &self,
        booking: &Booking,
        window: Duration,
    ) -> Result<ReserveOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(booking.trainer_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to lock trainer slot: {}", e)))?;

        let session_at = *booking.session_at.as_datetime();
        let clash: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM bookings
            WHERE trainer_id = $1
              AND status = 'upcoming'
              AND session_at > $2
              AND session_at < $3
            ORDER BY session_at
            LIMIT 1
            "#,
        )
        .bind(booking.trainer_id.as_str())
        .bind(session_at - window)
        .bind(session_at + window)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check availability: {}", e)))?;

        if let Some(existing) = clash {
            // Dropping the transaction rolls back and frees the lock
            return Ok(ReserveOutcome::Conflict {
                existing: BookingId::from_uuid(existing),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, trainer_id, plan_id, category, session_at, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.user_id.as_str())
        .bind(booking.trainer_id.as_str())
        .bind(booking.plan_id.as_str())
        .bind(booking.category.as_str())
        .bind(booking.session_at.as_datetime())
        .bind(booking.status.as_str())
        .bind(booking.created_at.as_datetime())
        .bind(booking.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert booking: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit booking: {}", e)))?;

        Ok(ReserveOutcome::Inserted)
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch booking: {}", e)))?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 ORDER BY session_at",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list bookings: {}", e)))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn finalize(
        &self,
        id: &BookingId,
        status: BookingStatus,
        now: Timestamp,
    ) -> Result<FinalizeResult, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET status = $2, updated_at = $3
            WHERE id = $1 AND status = 'upcoming'
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to finalize booking: {}", e)))?;

        Ok(if result.rows_affected() == 1 {
            FinalizeResult::Applied
        } else {
            FinalizeResult::NotUpcoming
        })
    }
}
