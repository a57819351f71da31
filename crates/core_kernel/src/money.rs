//! Price arithmetic with precise decimals
//!
//! Property prices, sale values and taxes are stored as `numeric(18,2)`.
//! This module keeps the rounding rule in one place and models the sale tax
//! rate as a validated percentage.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Decimal places persisted for monetary columns
pub const MONEY_SCALE: u32 = 2;

/// Errors raised by price and percentage helpers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    #[error("Overflow during calculation")]
    Overflow,
}

/// Rounds an amount to the persisted scale, half away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Checks that an amount is strictly positive
pub fn ensure_positive(amount: Decimal, label: &str) -> Result<Decimal, MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::InvalidAmount(format!(
            "{} must be greater than 0",
            label
        )));
    }
    Ok(amount)
}

/// A percentage in the closed range 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    /// Zero percent
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);

    /// Creates a percentage, rejecting values outside 0..=100
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(MoneyError::PercentageOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw percentage value (e.g. 10 for 10 %)
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Applies the percentage to an amount: `amount × (pct / 100)`
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_kernel::Percentage;
    /// use rust_decimal_macros::dec;
    ///
    /// let ten = Percentage::new(dec!(10)).unwrap();
    /// assert_eq!(ten.of(dec!(100000)).unwrap(), dec!(10000.00));
    /// ```
    pub fn of(&self, amount: Decimal) -> Result<Decimal, MoneyError> {
        let rate = self.0 / dec!(100);
        amount
            .checked_mul(rate)
            .map(round_money)
            .ok_or(MoneyError::Overflow)
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(pct: Percentage) -> Decimal {
        pct.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(dec!(0)).is_ok());
        assert!(Percentage::new(dec!(100)).is_ok());
        assert!(Percentage::new(dec!(100.01)).is_err());
        assert!(Percentage::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_ensure_positive_rejects_zero() {
        assert!(ensure_positive(Decimal::ZERO, "Sale price").is_err());
        assert_eq!(ensure_positive(dec!(0.01), "Sale price"), Ok(dec!(0.01)));
    }
}
