//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host/port combination")]
    InvalidSocketAddr,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Razorpay key id format")]
    InvalidRazorpayKeyId,

    #[error("Invalid currency code")]
    InvalidCurrency,

    #[error("Gateway timeout must be between 1 and 60 seconds")]
    InvalidGatewayTimeout,

    #[error("Lead time must be between 0 and 168 hours")]
    InvalidLeadTime,

    #[error("Conflict window must be between 1 and 1440 minutes")]
    InvalidConflictWindow,

    #[error("Reconcile batch size must be between 1 and 1000")]
    InvalidBatchSize,
}
