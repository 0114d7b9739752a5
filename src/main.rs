//! Boxercise API server.
//!
//! Loads `BOXERCISE__*` configuration, selects PostgreSQL or in-memory
//! stores, starts the pending-entitlement sweep and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use boxercise::adapters::auth::{JwtConfig, JwtSessionValidator, MockSessionValidator};
use boxercise::adapters::http::middleware::AuthState;
use boxercise::adapters::http::{api_router, BookingAppState, MembershipAppState, PaymentAppState};
use boxercise::adapters::memory::{
    InMemoryBookingStore, InMemoryMembershipStore, InMemoryOrderStore, InMemoryPurchaseStore,
};
use boxercise::adapters::postgres::{
    PostgresBookingRepository, PostgresMembershipRepository, PostgresOrderRepository,
    PostgresPurchaseRepository,
};
use boxercise::adapters::razorpay::{RazorpayConfig, RazorpayGatewayAdapter, UnconfiguredGateway};
use boxercise::adapters::SystemClock;
use boxercise::application::{ReconcilePendingCommand, ReconcilePendingHandler};
use boxercise::config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, PaymentConfig, ServerConfig};
use boxercise::domain::membership::PlanCatalog;
use boxercise::domain::payment::{Currency, SignatureVerifier};
use boxercise::ports::{
    BookingRepository, Clock, MembershipRepository, OrderRepository, PaymentGateway,
    PurchaseRepository,
};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

struct Stores {
    bookings: Arc<dyn BookingRepository>,
    orders: Arc<dyn OrderRepository>,
    purchases: Arc<dyn PurchaseRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // --- 1. Configuration and logging ---
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config
        .validate()
        .map_err(|e| StartupError::Config(ConfigError::ValidationFailed(e)))?;
    info!(environment = ?config.server.environment, "Configuration loaded");

    // --- 2. Stores ---
    let stores = connect_stores(&config.database).await?;

    // --- 3. Services ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let catalog = Arc::new(PlanCatalog::standard());
    let gateway = build_gateway(&config.payment)?;
    let default_currency = Currency::new(&config.payment.default_currency)
        .map_err(|e| StartupError::Invalid(e.to_string()))?;
    if config.payment.expose_signature_debug {
        warn!("Signature mismatch responses will include expected and received signatures");
    }

    let booking = BookingAppState {
        repository: stores.bookings.clone(),
        clock: clock.clone(),
        policy: config.scheduling.policy(),
    };
    let payment = PaymentAppState {
        gateway,
        orders: stores.orders.clone(),
        purchases: stores.purchases.clone(),
        memberships: stores.memberships.clone(),
        catalog,
        clock: clock.clone(),
        checkout_verifier: config.payment.key_secret().and_then(SignatureVerifier::new),
        webhook_verifier: config.payment.webhook_secret().and_then(SignatureVerifier::new),
        default_currency,
        expose_signature_debug: config.payment.expose_signature_debug,
    };
    let membership = MembershipAppState {
        memberships: stores.memberships.clone(),
        clock: clock.clone(),
    };

    // --- 4. Pending entitlement sweep ---
    if let Some(period) = config.settlement.reconcile_interval() {
        let sweep = ReconcilePendingHandler::new(
            stores.purchases.clone(),
            stores.orders.clone(),
            payment.entitlement_granter(),
            clock.clone(),
        );
        let limit = config.settlement.reconcile_batch_size;
        tokio::spawn(run_sweep(sweep, period, limit));
        info!(interval_secs = period.as_secs(), limit, "Pending entitlement sweep started");
    }

    // --- 5. Router ---
    let app = api_router(booking, payment, membership, build_auth(&config.auth))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
        .layer(build_cors(&config.server)?)
        .layer(TraceLayer::new_for_http());

    // --- 6. Serve ---
    let addr = config
        .server
        .socket_addr()
        .map_err(|e| StartupError::Config(ConfigError::ValidationFailed(e)))?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Boxercise API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect_stores(database: &DatabaseConfig) -> Result<Stores, StartupError> {
    if database.is_memory() {
        warn!("No database URL configured, using in-memory stores");
        return Ok(Stores {
            bookings: Arc::new(InMemoryBookingStore::new()),
            orders: Arc::new(InMemoryOrderStore::new()),
            purchases: Arc::new(InMemoryPurchaseStore::new()),
            memberships: Arc::new(InMemoryMembershipStore::new()),
        });
    }

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .acquire_timeout(database.acquire_timeout())
        .idle_timeout(database.idle_timeout())
        .connect(&database.url)
        .await?;
    info!(max_connections = database.max_connections, "Connected to PostgreSQL");

    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations complete");
    }

    Ok(Stores {
        bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
        purchases: Arc::new(PostgresPurchaseRepository::new(pool.clone())),
        memberships: Arc::new(PostgresMembershipRepository::new(pool)),
    })
}

fn build_gateway(payment: &PaymentConfig) -> Result<Arc<dyn PaymentGateway>, StartupError> {
    let (Some(key_id), Some(key_secret)) = (payment.key_id(), payment.key_secret()) else {
        warn!("Razorpay credentials not configured, order creation is disabled");
        return Ok(Arc::new(UnconfiguredGateway));
    };

    let config = RazorpayConfig::new(key_id, key_secret)
        .with_base_url(payment.api_base_url.clone())
        .with_timeout(payment.gateway_timeout());
    let adapter =
        RazorpayGatewayAdapter::new(config).map_err(|e| StartupError::Invalid(e.to_string()))?;
    info!(test_mode = payment.is_test_mode(), "Razorpay gateway configured");
    Ok(Arc::new(adapter))
}

fn build_auth(auth: &AuthConfig) -> AuthState {
    let Some(secret) = auth.jwt_secret() else {
        warn!("No JWT secret configured, every bearer token will be rejected");
        return Arc::new(MockSessionValidator::new());
    };

    let mut jwt = JwtConfig::new(secret.clone()).with_leeway(auth.leeway_secs);
    if let Some(issuer) = &auth.jwt_issuer {
        jwt = jwt.with_issuer(issuer.clone());
    }
    if let Some(audience) = &auth.jwt_audience {
        jwt = jwt.with_audience(audience.clone());
    }
    Arc::new(JwtSessionValidator::new(jwt))
}

fn build_cors(server: &ServerConfig) -> Result<CorsLayer, StartupError> {
    let origins = server
        .cors_origins_list()
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| StartupError::Invalid(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]))
}

async fn run_sweep(handler: ReconcilePendingHandler, period: Duration, limit: u32) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match handler.handle(ReconcilePendingCommand { limit }).await {
            Ok(result) if result.examined > 0 => info!(
                examined = result.examined,
                granted = result.granted,
                unresolved = result.unresolved,
                failed = result.failed,
                rejected = result.rejected,
                "Pending entitlement sweep finished"
            ),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Pending entitlement sweep failed"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
