//! Fixed-point decimal with two fractional digits.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// Largest magnitude accepted, exclusive. Keeps hundredths within `i64`.
const MAX_ABS_UNITS: i64 = 10_000_000_000_000_000;

/// A decimal value held at exactly two fractional digits.
///
/// Readings arrive as JSON numbers. The number's text is parsed as a decimal
/// and rounded half away from zero, so `1.005` becomes `1.01`. Comparisons
/// are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Decimal2(Decimal);

impl Decimal2 {
    /// Build directly from hundredths (`620` is `6.20`).
    pub fn from_hundredths(hundredths: i64) -> Self {
        Self(Decimal::new(hundredths, 2))
    }

    /// Round an arbitrary decimal to two fractional digits.
    pub fn from_decimal(value: Decimal) -> crate::Result<Self> {
        if value.abs() >= Decimal::from(MAX_ABS_UNITS) {
            return Err(CoreError::Validation("decimal value out of range".to_string()));
        }
        let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Ok(Self(rounded))
    }

    /// Round a float through its shortest decimal text.
    pub fn try_from_f64(value: f64) -> crate::Result<Self> {
        if !value.is_finite() {
            return Err(CoreError::Validation(
                "decimal value must be a finite number".to_string(),
            ));
        }
        value.to_string().parse()
    }

    /// Stored hundredths.
    pub fn hundredths(&self) -> i64 {
        // scale is pinned to 2 and magnitude bounded by MAX_ABS_UNITS
        self.0.mantissa() as i64
    }

    /// Underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Lossy float view, for serialization and chart math.
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Number of digits before and after the point, ignoring sign.
    pub fn total_digits(&self) -> u32 {
        let mut n = self.0.mantissa().unsigned_abs();
        let mut digits = 0;
        while n > 0 {
            digits += 1;
            n /= 10;
        }
        // always at least "0.00"
        digits.max(3)
    }

    /// Reject values wider than `max_digits` total digits.
    pub fn check_max_digits(&self, field: &str, max_digits: u32) -> crate::Result<()> {
        if self.total_digits() > max_digits {
            return Err(CoreError::Validation(format!(
                "{field} must have at most {max_digits} digits"
            )));
        }
        Ok(())
    }
}

impl FromStr for Decimal2 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .map_err(|_| CoreError::Validation(format!("not a decimal number: {s}")))?;
        Self::from_decimal(value)
    }
}

impl fmt::Display for Decimal2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Decimal2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Decimal2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Number keeps the literal's shortest text, so no binary rounding leaks in
        let number = serde_json::Number::deserialize(deserializer)?;
        number
            .to_string()
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
