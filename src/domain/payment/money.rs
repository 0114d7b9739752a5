//! Money value objects.
//!
//! Amounts arrive from clients in major units (rupees) as JSON numbers or
//! numeric strings. Everything past the HTTP boundary works in integer
//! minor units (paise).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Default settlement currency.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Largest amount accepted in major units.
const MAX_MAJOR_UNITS: f64 = 10_000_000.0;

/// ISO 4217 currency code, upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter ISO 4217 code",
            ));
        }
        Ok(Self(code))
    }

    pub fn inr() -> Self {
        Self(DEFAULT_CURRENCY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::inr()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positive amount in integer minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Wraps an already-converted amount. Must be positive.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::out_of_range("amount", 1, i64::MAX, value));
        }
        Ok(Self(value))
    }

    /// Converts a major-unit amount, rounding half away from zero.
    ///
    /// 499.5 becomes 49950; 0.005 becomes 1.
    pub fn from_major(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::invalid_format("amount", "must be a finite number"));
        }
        if amount <= 0.0 {
            return Err(ValidationError::invalid_format("amount", "must be greater than zero"));
        }
        if amount > MAX_MAJOR_UNITS {
            return Err(ValidationError::invalid_format("amount", "exceeds the maximum order amount"));
        }
        // f64::round rounds half away from zero.
        Self::new((amount * 100.0).round() as i64)
    }

    /// Parses a client-supplied JSON value (number or numeric string).
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        let amount = match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ValidationError::invalid_format("amount", "not a number"))?,
            serde_json::Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::invalid_format("amount", "not a number"))?,
            serde_json::Value::Null => return Err(ValidationError::empty_field("amount")),
            _ => return Err(ValidationError::invalid_format("amount", "not a number")),
        };
        Self::from_major(amount)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
