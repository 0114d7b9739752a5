//! HTTP handlers for payment endpoints.
//!
//! The webhook handler reads the body as raw bytes: the signature covers the
//! exact bytes the gateway sent, so the body must not be re-serialized
//! before verification.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::adapters::http::error::{json_rejection, ErrorResponse};
use crate::adapters::http::middleware::OptionalAuth;
use crate::application::{
    ActivateEntitlementHandler, CreateOrderCommand, CreateOrderHandler, EntitlementGranter,
    HandleWebhookCommand, HandleWebhookHandler, SettlePaymentHandler, VerifyCheckoutCommand,
    VerifyCheckoutHandler,
};
use crate::domain::foundation::{PlanId, ValidationError};
use crate::domain::membership::PlanCatalog;
use crate::domain::payment::{Currency, MinorUnits, PaymentError, SignatureVerifier};
use crate::ports::{Clock, MembershipRepository, OrderRepository, PaymentGateway, PurchaseRepository};

use super::dto::{
    CreateOrderRequest, CreateOrderResponse, VerifyCheckoutRequest, VerifyCheckoutResponse,
    WebhookAckResponse,
};

/// Header carrying the webhook body signature.
pub const SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct PaymentAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub orders: Arc<dyn OrderRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub catalog: Arc<PlanCatalog>,
    pub clock: Arc<dyn Clock>,
    /// Keyed with the API key secret; `None` when it is not configured.
    pub checkout_verifier: Option<SignatureVerifier>,
    /// Keyed with the webhook secret; `None` when it is not configured.
    pub webhook_verifier: Option<SignatureVerifier>,
    pub default_currency: Currency,
    pub expose_signature_debug: bool,
}

impl PaymentAppState {
    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.gateway.clone(),
            self.orders.clone(),
            self.catalog.clone(),
            self.clock.clone(),
        )
    }

    pub fn entitlement_granter(&self) -> Arc<EntitlementGranter> {
        let activator = Arc::new(ActivateEntitlementHandler::new(
            self.memberships.clone(),
            self.catalog.clone(),
            self.clock.clone(),
        ));
        Arc::new(EntitlementGranter::new(
            self.purchases.clone(),
            self.orders.clone(),
            activator,
            self.clock.clone(),
        ))
    }

    pub fn settle_handler(&self) -> Arc<SettlePaymentHandler> {
        Arc::new(SettlePaymentHandler::new(
            self.purchases.clone(),
            self.orders.clone(),
            self.entitlement_granter(),
            self.clock.clone(),
        ))
    }

    pub fn verify_handler(&self) -> VerifyCheckoutHandler {
        VerifyCheckoutHandler::new(self.checkout_verifier.clone(), self.settle_handler())
    }

    pub fn webhook_handler(&self) -> HandleWebhookHandler {
        HandleWebhookHandler::new(self.webhook_verifier.clone(), self.settle_handler())
    }

    fn api_error(&self, err: PaymentError) -> PaymentApiError {
        PaymentApiError::new(err).with_signature_debug(self.expose_signature_debug)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payments/order
pub async fn create_order(
    State(state): State<PaymentAppState>,
    OptionalAuth(user): OptionalAuth,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Response, PaymentApiError> {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return Ok(json_rejection(rejection)),
    };

    let amount = MinorUnits::from_json(&request.amount)?;
    let currency = match request.currency.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => Currency::new(code)?,
        _ => state.default_currency.clone(),
    };
    let plan_id = optional_plan(request.plan_id)?;

    let order = state
        .create_order_handler()
        .handle(CreateOrderCommand {
            amount,
            currency,
            plan_id,
            user_id: user.map(|u| u.id),
        })
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(CreateOrderResponse::from(order)).into_response())
}

/// POST /payments/verify
pub async fn verify_checkout(
    State(state): State<PaymentAppState>,
    OptionalAuth(user): OptionalAuth,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, PaymentApiError> {
    let Json(raw_payload) = match body {
        Ok(body) => body,
        Err(rejection) => return Ok(json_rejection(rejection)),
    };

    let request: VerifyCheckoutRequest = serde_json::from_value(raw_payload.clone())
        .map_err(|e| ValidationError::invalid_format("body", e.to_string()))?;

    let result = state
        .verify_handler()
        .handle(VerifyCheckoutCommand {
            order_id: request.order_id,
            payment_id: request.payment_id,
            signature: request.signature,
            plan_id: optional_plan(request.plan_id)?,
            user_id: user.map(|u| u.id),
            raw_payload,
        })
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(VerifyCheckoutResponse::from(result)).into_response())
}

/// POST /payments/webhook
pub async fn handle_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PaymentApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = state
        .webhook_handler()
        .handle(HandleWebhookCommand {
            body: body.to_vec(),
            signature,
        })
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(WebhookAckResponse::from(outcome)))
}

fn optional_plan(plan_id: Option<String>) -> Result<Option<PlanId>, ValidationError> {
    plan_id
        .filter(|p| !p.trim().is_empty())
        .map(PlanId::new)
        .transpose()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
///
/// Signature mismatches echo the expected and received values only when
/// `expose_signature_debug` is set.
#[derive(Debug)]
pub struct PaymentApiError {
    error: PaymentError,
    expose_signature_debug: bool,
}

impl PaymentApiError {
    pub fn new(error: PaymentError) -> Self {
        Self {
            error,
            expose_signature_debug: false,
        }
    }

    pub fn with_signature_debug(mut self, enabled: bool) -> Self {
        self.expose_signature_debug = enabled;
        self
    }
}

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self::new(err)
    }
}

impl From<ValidationError> for PaymentApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(PaymentError::Validation(err))
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let code = self.error.code().to_string();

        let (status, body) = match &self.error {
            PaymentError::Validation(_)
            | PaymentError::MissingField(_)
            | PaymentError::UnknownPlan(_)
            | PaymentError::PlanPriceMismatch { .. } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(code, self.error.to_string()),
            ),
            PaymentError::SignatureMismatch(mismatch) => {
                let body = ErrorResponse::new(code, "Signature mismatch");
                let body = if self.expose_signature_debug {
                    body.with_details(json!({
                        "expected": mismatch.expected,
                        "received": mismatch.received,
                    }))
                } else {
                    body
                };
                (StatusCode::BAD_REQUEST, body)
            }
            PaymentError::NotConfigured(setting) => {
                tracing::error!(setting = %setting, "Payment endpoint called without configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(code, "Payment service is not configured"),
                )
            }
            PaymentError::Upstream(msg) => {
                tracing::error!(error = %msg, "Payment gateway request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(code, "Payment gateway is unavailable, please retry"),
                )
            }
            PaymentError::Persistence(msg) => {
                tracing::error!(error = %msg, "Payment could not be recorded");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        code,
                        "Payment succeeded but verification failed. Please contact support.",
                    ),
                )
            }
        };

        body.into_response_with(status)
    }
}
