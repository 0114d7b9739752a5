//! CreateOrderHandler - Creates a gateway order before checkout.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, PlanId, UserId};
use crate::domain::membership::PlanCatalog;
use crate::domain::payment::{Currency, MinorUnits, Order, OrderNotes, PaymentError, Receipt};
use crate::ports::{Clock, CreateOrderRequest, GatewayErrorCode, OrderRepository, PaymentGateway};

/// Command to create an order. The amount is already validated and in
/// minor units.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub amount: MinorUnits,
    pub currency: Currency,
    pub plan_id: Option<PlanId>,
    pub user_id: Option<UserId>,
}

pub struct CreateOrderHandler {
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<PlanCatalog>,
    clock: Arc<dyn Clock>,
}

impl CreateOrderHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<PlanCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            orders,
            catalog,
            clock,
        }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<Order, PaymentError> {
        // 1. Plan pricing
        if let Some(plan_id) = &cmd.plan_id {
            let plan = self
                .catalog
                .get(plan_id)
                .ok_or_else(|| PaymentError::UnknownPlan(plan_id.clone()))?;
            if !plan.is_paid_by(cmd.amount) {
                return Err(PaymentError::PlanPriceMismatch {
                    plan_id: plan_id.clone(),
                    expected: plan.price_minor(),
                    actual: cmd.amount.value(),
                });
            }
        }

        // 2. One call to the gateway
        let now = self.clock.now();
        let receipt = Receipt::generate(now);
        let request = CreateOrderRequest {
            amount: cmd.amount,
            currency: cmd.currency.clone(),
            receipt: receipt.clone(),
            notes: OrderNotes {
                user_id: cmd.user_id.as_ref().map(|id| id.to_string()),
                plan_id: cmd.plan_id.as_ref().map(|id| id.to_string()),
            },
        };

        let created = self.gateway.create_order(request).await.map_err(|e| {
            tracing::error!(error = %e, receipt = receipt.as_str(), "Gateway order creation failed");
            match e.code {
                GatewayErrorCode::NotConfigured => PaymentError::NotConfigured("RAZORPAY_KEY_ID"),
                _ => PaymentError::upstream(e.message),
            }
        })?;

        let order_id = OrderId::new(created.id)
            .map_err(|_| PaymentError::upstream("Gateway returned an order without an id"))?;

        let order = Order::created(
            order_id,
            cmd.amount,
            cmd.currency,
            receipt,
            cmd.user_id,
            cmd.plan_id,
            now,
        );

        // 3. Cache for purchaser lookup on the webhook path
        if let Err(e) = self.orders.save(&order).await {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to cache order");
        }

        tracing::info!(
            order_id = %order.id,
            amount = order.amount.value(),
            currency = order.currency.as_str(),
            "Order created"
        );

        Ok(order)
    }
}
