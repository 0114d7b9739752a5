//! PostgreSQL implementation of OrderRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, OrderId, PaymentId, PlanId, Timestamp, UserId};
use crate::domain::payment::{Currency, MinorUnits, Order, OrderStatus, Receipt};
use crate::ports::OrderRepository;

use super::invalid_column;

#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    amount: i64,
    currency: String,
    receipt: String,
    status: String,
    user_id: Option<String>,
    plan_id: Option<String>,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::new(row.id).map_err(|e| invalid_column("id", e))?,
            amount: MinorUnits::new(row.amount).map_err(|e| invalid_column("amount", e))?,
            currency: Currency::new(&row.currency).map_err(|e| invalid_column("currency", e))?,
            receipt: Receipt::from_string(row.receipt),
            status: OrderStatus::parse(&row.status).map_err(|e| invalid_column("status", e))?,
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
            payment_id: row
                .payment_id
                .map(PaymentId::new)
                .transpose()
                .map_err(|e| invalid_column("payment_id", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
            paid_at: row.paid_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, amount, currency, receipt, status, user_id, plan_id, payment_id, created_at, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.amount.value())
        .bind(order.currency.as_str())
        .bind(order.receipt.as_str())
        .bind(order.status.as_str())
        .bind(order.user_id.as_ref().map(UserId::as_str))
        .bind(order.plan_id.as_ref().map(PlanId::as_str))
        .bind(order.payment_id.as_ref().map(PaymentId::as_str))
        .bind(order.created_at.as_datetime())
        .bind(order.paid_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save order: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, amount, currency, receipt, status, user_id, plan_id, payment_id, created_at, paid_at
            FROM orders WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }

    async fn mark_paid(
        &self,
        id: &OrderId,
        payment_id: &PaymentId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = 'paid', payment_id = $2, paid_at = $3
            WHERE id = $1 AND status = 'created'
            "#,
        )
        .bind(id.as_str())
        .bind(payment_id.as_str())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to mark order paid: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }
}
