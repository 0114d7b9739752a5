//! PostgreSQL implementation of PurchaseRepository.
//!
//! `payment_id` is the primary key, so concurrent settlements of one payment
//! race on the insert and exactly one wins. The entitlement flag flips with
//! a conditional update from `pending` to `granted`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, PlanId, Timestamp, UserId};
use crate::domain::settlement::{EntitlementState, Purchase, Purchaser, SettlementSource};
use crate::ports::{ClaimResult, PurchaseRepository, SaveResult};

use super::invalid_column;

#[derive(Clone)]
pub struct PostgresPurchaseRepository {
    pool: PgPool,
}

impl PostgresPurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    payment_id: String,
    order_id: String,
    user_id: Option<String>,
    plan_id: Option<String>,
    amount: Option<i64>,
    currency: Option<String>,
    method: Option<String>,
    raw_payload: serde_json::Value,
    source: String,
    entitlement: String,
    entitlement_granted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    sweep_attempts: i32,
    last_swept_at: Option<DateTime<Utc>>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Purchase {
            payment_id: PaymentId::new(row.payment_id).map_err(|e| invalid_column("payment_id", e))?,
            order_id: OrderId::new(row.order_id).map_err(|e| invalid_column("order_id", e))?,
            user_id: row
                .user_id
                .map(UserId::new)
                .transpose()
                .map_err(|e| invalid_column("user_id", e))?,
            plan_id: row
                .plan_id
                .map(PlanId::new)
                .transpose()
                .map_err(|e| invalid_column("plan_id", e))?,
            amount: row.amount,
            currency: row.currency,
            method: row.method,
            raw_payload: row.raw_payload,
            source: SettlementSource::parse(&row.source).map_err(|e| invalid_column("source", e))?,
            entitlement: EntitlementState::parse(&row.entitlement)
                .map_err(|e| invalid_column("entitlement", e))?,
            entitlement_granted_at: row.entitlement_granted_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            sweep_attempts: u32::try_from(row.sweep_attempts)
                .map_err(|e| invalid_column("sweep_attempts", e))?,
            last_swept_at: row.last_swept_at.map(Timestamp::from_datetime),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT payment_id, order_id, user_id, plan_id, amount, currency, method,
           raw_payload, source, entitlement, entitlement_granted_at, created_at,
           sweep_attempts, last_swept_at
    FROM purchases
"#;

#[async_trait]
impl PurchaseRepository for PostgresPurchaseRepository {
    async fn insert_if_absent(&self, purchase: &Purchase) -> Result<SaveResult, DomainError> {
        let inserted: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO purchases (
                payment_id, order_id, user_id, plan_id, amount, currency, method,
                raw_payload, source, status, entitlement, entitlement_granted_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'paid', $10, $11, $12)
            ON CONFLICT (payment_id) DO NOTHING
            RETURNING payment_id
            "#,
        )
        .bind(purchase.payment_id.as_str())
        .bind(purchase.order_id.as_str())
        .bind(purchase.user_id.as_ref().map(UserId::as_str))
        .bind(purchase.plan_id.as_ref().map(PlanId::as_str))
        .bind(purchase.amount)
        .bind(purchase.currency.as_deref())
        .bind(purchase.method.as_deref())
        .bind(&purchase.raw_payload)
        .bind(purchase.source.as_str())
        .bind(purchase.entitlement.as_str())
        .bind(purchase.entitlement_granted_at.map(|t| *t.as_datetime()))
        .bind(purchase.created_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert purchase: {}", e)))?;

        Ok(match inserted {
            Some(_) => SaveResult::Inserted,
            None => SaveResult::AlreadyExists,
        })
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Purchase>, DomainError> {
        let row: Option<PurchaseRow> =
            sqlx::query_as(&format!("{} WHERE payment_id = $1", SELECT_COLUMNS))
                .bind(payment_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to fetch purchase: {}", e)))?;

        row.map(Purchase::try_from).transpose()
    }

    async fn mark_entitlement_granted(
        &self,
        payment_id: &PaymentId,
        purchaser: &Purchaser,
        now: Timestamp,
    ) -> Result<ClaimResult, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE purchases SET
                entitlement = 'granted',
                entitlement_granted_at = $2,
                user_id = COALESCE(user_id, $3),
                plan_id = COALESCE(plan_id, $4)
            WHERE payment_id = $1 AND entitlement = 'pending'
            "#,
        )
        .bind(payment_id.as_str())
        .bind(now.as_datetime())
        .bind(purchaser.user_id.as_str())
        .bind(purchaser.plan_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to claim entitlement: {}", e)))?;

        Ok(if result.rows_affected() == 1 {
            ClaimResult::Claimed
        } else {
            ClaimResult::NotClaimed
        })
    }

    async fn record_sweep_attempt(
        &self,
        payment_id: &PaymentId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE purchases SET
                sweep_attempts = sweep_attempts + 1,
                last_swept_at = $2
            WHERE payment_id = $1 AND entitlement = 'pending'
            "#,
        )
        .bind(payment_id.as_str())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record sweep attempt: {}", e)))?;

        Ok(())
    }

    async fn list_pending(&self, limit: u32) -> Result<Vec<Purchase>, DomainError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(&format!(
            "{} WHERE entitlement = 'pending' ORDER BY last_swept_at NULLS FIRST, created_at LIMIT $1",
            SELECT_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list pending purchases: {}", e)))?;

        rows.into_iter().map(Purchase::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(entitlement: &str) -> PurchaseRow {
        PurchaseRow {
            payment_id: "pay_1".to_string(),
            order_id: "order_1".to_string(),
            user_id: None,
            plan_id: Some("lite".to_string()),
            amount: Some(49950),
            currency: Some("INR".to_string()),
            method: Some("upi".to_string()),
            raw_payload: json!({"razorpay_payment_id": "pay_1"}),
            source: "webhook".to_string(),
            entitlement: entitlement.to_string(),
            entitlement_granted_at: None,
            created_at: Utc::now(),
            sweep_attempts: 0,
            last_swept_at: None,
        }
    }

    #[test]
    fn pending_row_converts_without_purchaser() {
        let purchase = Purchase::try_from(row("pending")).unwrap();
        assert!(purchase.is_entitlement_pending());
        assert!(purchase.purchaser().is_none());
        assert_eq!(purchase.source, SettlementSource::Webhook);
    }

    #[test]
    fn negative_sweep_attempts_are_rejected() {
        let mut bad = row("pending");
        bad.sweep_attempts = -1;
        assert!(Purchase::try_from(bad).is_err());
    }

    #[test]
    fn unknown_entitlement_state_is_rejected() {
        assert!(Purchase::try_from(row("revoked")).is_err());
    }
}
