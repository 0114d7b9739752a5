//! PostgreSQL implementation of MembershipRepository.
//!
//! Activation appends the ledger entry and upserts the current membership in
//! one transaction. A payment id already in the ledger makes it a no-op.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, PlanId, Timestamp, UserId};
use crate::domain::membership::{LedgerEntry, Membership, PaymentReference};
use crate::ports::{ActivationResult, MembershipRepository};

use super::invalid_column;

/// PostgreSQL implementation of the MembershipRepository port.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    user_id: String,
    plan_id: String,
    title: String,
    price: i64,
    sessions_included: i32,
    started_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    payment_id: String,
    order_id: String,
    payment_method: Option<String>,
    verified: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            user_id: UserId::new(row.user_id).map_err(|e| invalid_column("user_id", e))?,
            plan_id: PlanId::new(row.plan_id).map_err(|e| invalid_column("plan_id", e))?,
            title: row.title,
            price: row.price,
            sessions_included: u32::try_from(row.sessions_included)
                .map_err(|e| invalid_column("sessions_included", e))?,
            started_at: Timestamp::from_datetime(row.started_at),
            expires_at: Timestamp::from_datetime(row.expires_at),
            payment: PaymentReference {
                payment_id: PaymentId::new(row.payment_id)
                    .map_err(|e| invalid_column("payment_id", e))?,
                order_id: OrderId::new(row.order_id).map_err(|e| invalid_column("order_id", e))?,
                method: row.payment_method,
                verified: row.verified,
            },
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    user_id: String,
    plan_id: String,
    title: String,
    price: i64,
    started_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    payment_id: String,
    order_id: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = DomainError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(LedgerEntry {
            user_id: UserId::new(row.user_id).map_err(|e| invalid_column("user_id", e))?,
            plan_id: PlanId::new(row.plan_id).map_err(|e| invalid_column("plan_id", e))?,
            title: row.title,
            price: row.price,
            started_at: Timestamp::from_datetime(row.started_at),
            expires_at: Timestamp::from_datetime(row.expires_at),
            payment_id: PaymentId::new(row.payment_id).map_err(|e| invalid_column("payment_id", e))?,
            order_id: OrderId::new(row.order_id).map_err(|e| invalid_column("order_id", e))?,
            recorded_at: Timestamp::from_datetime(row.recorded_at),
        })
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn save_activation(
        &self,
        membership: &Membership,
        entry: &LedgerEntry,
    ) -> Result<ActivationResult, DomainError> {
        let sessions_included = i32::try_from(membership.sessions_included)
            .map_err(|e| DomainError::validation("sessions_included", e.to_string()))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;

        // The unique payment_id makes a concurrent duplicate wait here, then
        // see the committed entry.
        let appended: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO membership_ledger (
                user_id, plan_id, title, price, started_at, expires_at, payment_id, order_id, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (payment_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(entry.user_id.as_str())
        .bind(entry.plan_id.as_str())
        .bind(&entry.title)
        .bind(entry.price)
        .bind(entry.started_at.as_datetime())
        .bind(entry.expires_at.as_datetime())
        .bind(entry.payment_id.as_str())
        .bind(entry.order_id.as_str())
        .bind(entry.recorded_at.as_datetime())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to append ledger entry: {}", e)))?;

        if appended.is_none() {
            tx.rollback()
                .await
                .map_err(|e| DomainError::database(format!("Failed to roll back activation: {}", e)))?;
            return Ok(ActivationResult::AlreadyActivated);
        }

        sqlx::query(
            r#"
            INSERT INTO memberships (
                user_id, plan_id, title, price, sessions_included, started_at, expires_at,
                payment_id, order_id, payment_method, verified, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE SET
                plan_id = EXCLUDED.plan_id,
                title = EXCLUDED.title,
                price = EXCLUDED.price,
                sessions_included = EXCLUDED.sessions_included,
                started_at = EXCLUDED.started_at,
                expires_at = EXCLUDED.expires_at,
                payment_id = EXCLUDED.payment_id,
                order_id = EXCLUDED.order_id,
                payment_method = EXCLUDED.payment_method,
                verified = EXCLUDED.verified,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(membership.user_id.as_str())
        .bind(membership.plan_id.as_str())
        .bind(&membership.title)
        .bind(membership.price)
        .bind(sessions_included)
        .bind(membership.started_at.as_datetime())
        .bind(membership.expires_at.as_datetime())
        .bind(membership.payment.payment_id.as_str())
        .bind(membership.payment.order_id.as_str())
        .bind(membership.payment.method.as_deref())
        .bind(membership.payment.verified)
        .bind(membership.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save membership: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit activation: {}", e)))?;

        Ok(ActivationResult::Activated)
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT user_id, plan_id, title, price, sessions_included, started_at, expires_at,
                   payment_id, order_id, payment_method, verified, updated_at
            FROM memberships WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch membership: {}", e)))?;

        row.map(Membership::try_from).transpose()
    }

    async fn ledger_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>, DomainError> {
        let rows: Vec<LedgerRow> = sqlx::query_as(
            r#"
            SELECT user_id, plan_id, title, price, started_at, expires_at, payment_id, order_id, recorded_at
            FROM membership_ledger WHERE user_id = $1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch ledger: {}", e)))?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }
}
