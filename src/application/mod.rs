//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) are kept separate from query handlers (read).

pub mod handlers;

pub use handlers::booking::{
    CancelBookingCommand, CancelBookingHandler, CancelBookingResult, ListBookingsHandler,
    ListBookingsQuery, ProposeBookingCommand, ProposeBookingHandler,
};
pub use handlers::membership::{
    ActivateEntitlementCommand, ActivateEntitlementHandler, GetMembershipHandler, GetMembershipQuery,
};
pub use handlers::payment::{
    CreateOrderCommand, CreateOrderHandler, HandleWebhookCommand, HandleWebhookHandler,
    VerifyCheckoutCommand, VerifyCheckoutHandler, WebhookOutcome,
};
pub use handlers::settlement::{
    EntitlementGranter, EntitlementOutcome, ReconcilePendingCommand, ReconcilePendingHandler,
    ReconcileResult, SettlePaymentCommand, SettlePaymentHandler, SettleResult, SettlementOutcome,
};
