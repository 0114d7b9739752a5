//! Application configuration module
//!
//! Configuration is loaded from environment variables with the `BOXERCISE`
//! prefix, using `__` (double underscore) between nested keys. Every section
//! has defaults, so an empty environment starts a development server backed
//! by in-memory stores.
//!
//! # Example
//!
//! ```no_run
//! use boxercise::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod payment;
mod scheduling;
mod server;
mod settlement;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use scheduling::SchedulingConfig;
pub use server::{Environment, ServerConfig};
pub use settlement::SettlementConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration; empty URL selects in-memory stores
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Bearer token validation
    #[serde(default)]
    pub auth: AuthConfig,

    /// Payment gateway (Razorpay)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Lead time and conflict window
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Pending entitlement sweep
    #[serde(default)]
    pub settlement: SettlementConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `BOXERCISE__*` variables.
    ///
    /// - `BOXERCISE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `BOXERCISE__PAYMENT__RAZORPAY_KEY_ID=...` -> `payment.razorpay_key_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BOXERCISE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.scheduling.validate()?;
        self.settlement.validate()?;
        Ok(())
    }
}
