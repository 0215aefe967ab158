//! Value objects: equality by value, not identity.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, AppResult, FieldErrors};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances with
/// the same attributes are interchangeable. To "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Amount of money in Dominican pesos, held as integer cents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoneyDop {
    cents: i64,
}

impl ValueObject for MoneyDop {}

impl MoneyDop {
    pub const CURRENCY: &'static str = "DOP";

    /// Build from a decimal amount, rounding half-up to two decimals.
    ///
    /// Non-finite and negative amounts are rejected.
    pub fn from_amount(raw: f64) -> AppResult<Self> {
        if !raw.is_finite() {
            return Err(invalid("Amount must be a finite number"));
        }

        let cents = (raw * 100.0 + 0.5).floor();
        if cents < 0.0 {
            return Err(invalid("Amount cannot be negative"));
        }
        if cents > i64::MAX as f64 {
            return Err(invalid("Amount is too large"));
        }

        Ok(Self {
            cents: cents as i64,
        })
    }

    /// Rebuild from stored cents (already validated on write).
    pub fn from_cents(cents: i64) -> AppResult<Self> {
        if cents < 0 {
            return Err(invalid("Amount cannot be negative"));
        }
        Ok(Self { cents })
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn amount(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    pub fn currency(&self) -> &'static str {
        Self::CURRENCY
    }
}

fn invalid(message: &str) -> AppError {
    AppError::validation(message, FieldErrors::new())
}

impl core::fmt::Display for MoneyDop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.cents / 100,
            self.cents % 100,
            Self::CURRENCY
        )
    }
}

impl Serialize for MoneyDop {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.amount())
    }
}

impl<'de> Deserialize<'de> for MoneyDop {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Self::from_amount(raw).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}
