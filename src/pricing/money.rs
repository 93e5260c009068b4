//! Fixed-point currency amounts.
//!
//! Factor arithmetic stays in `f64`; the final figure is converted once into integer
//! minor units (cents for two-decimal currencies) and everything downstream is exact.

use serde::{Deserialize, Serialize};

use super::PricingError;

const MINOR_PER_MAJOR: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Amount in minor currency units.
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn from_major(major: i64) -> Self {
        Self(major * MINOR_PER_MAJOR)
    }

    /// Converts a float amount in major units, rounding half away from zero.
    pub fn from_major_f64(amount: f64) -> Result<Self, PricingError> {
        let minor = (amount * MINOR_PER_MAJOR as f64).round();
        if !minor.is_finite() || minor.abs() >= i64::MAX as f64 {
            return Err(PricingError::CalculationInvariant {
                reason: format!("amount {amount} cannot be represented as money"),
            });
        }
        Ok(Self(minor as i64))
    }

    /// Multiplies by a ratio, rounding half away from zero.
    pub fn scale(self, factor: f64) -> Result<Self, PricingError> {
        let minor = (self.0 as f64 * factor).round();
        if !minor.is_finite() || minor.abs() >= i64::MAX as f64 {
            return Err(PricingError::CalculationInvariant {
                reason: format!("{self} scaled by {factor} overflows"),
            });
        }
        Ok(Self(minor as i64))
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn as_major_f64(self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / MINOR_PER_MAJOR as u64;
        let minor = abs % MINOR_PER_MAJOR as u64;
        write!(f, "{sign}{major}.{minor:02}")
    }
}
