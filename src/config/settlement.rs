//! Entitlement sweep configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Seconds between sweeps; 0 disables the sweep
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,

    /// Pending purchases examined per sweep
    #[serde(default = "default_batch_size")]
    pub reconcile_batch_size: u32,
}

impl SettlementConfig {
    /// Sweep interval, or `None` when disabled.
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reconcile_batch_size == 0 || self.reconcile_batch_size > 1000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        Ok(())
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval(),
            reconcile_batch_size: default_batch_size(),
        }
    }
}

fn default_reconcile_interval() -> u64 {
    300
}

fn default_batch_size() -> u32 {
    50
}
