//! Booking rule configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::booking::{BookingPolicy, DEFAULT_CONFLICT_WINDOW_MINUTES, DEFAULT_LEAD_TIME_HOURS};

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// Minimum hours between booking and session start
    #[serde(default = "default_lead_time_hours")]
    pub lead_time_hours: u32,

    /// Minimum minutes between two sessions of one trainer
    #[serde(default = "default_conflict_window_minutes")]
    pub conflict_window_minutes: u32,
}

impl SchedulingConfig {
    pub fn policy(&self) -> BookingPolicy {
        BookingPolicy::from_config(self.lead_time_hours, self.conflict_window_minutes)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lead_time_hours > 168 {
            return Err(ValidationError::InvalidLeadTime);
        }
        if self.conflict_window_minutes == 0 || self.conflict_window_minutes > 1440 {
            return Err(ValidationError::InvalidConflictWindow);
        }
        Ok(())
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            lead_time_hours: default_lead_time_hours(),
            conflict_window_minutes: default_conflict_window_minutes(),
        }
    }
}

fn default_lead_time_hours() -> u32 {
    DEFAULT_LEAD_TIME_HOURS as u32
}

fn default_conflict_window_minutes() -> u32 {
    DEFAULT_CONFLICT_WINDOW_MINUTES as u32
}
