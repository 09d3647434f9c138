use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use thiserror::Error;

const SCALE: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount cannot be negative")]
    Negative,
    #[error("Amount cannot have more than two decimal places")]
    TooPrecise,
    #[error("Amount is out of range")]
    Overflow,
    #[error("Invalid amount: {0}")]
    Parse(String),
}

/// Currency amount with two decimal places. Persisted as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, SCALE));

    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::Negative);
        }
        Ok(Money(Decimal::new(cents, SCALE)))
    }

    pub fn cents(&self) -> i64 {
        // Construction keeps the scale at 2 and the mantissa within i64.
        self.0.mantissa() as i64
    }

    /// Multiplies by a whole quantity (nights). Exact: no rounding happens.
    pub fn times(self, quantity: i64) -> Result<Money, MoneyError> {
        let product = self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or(MoneyError::Overflow)?;
        Money::try_from(product)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::Negative);
        }
        if value.round_dp(SCALE) != value {
            return Err(MoneyError::TooPrecise);
        }

        let mut normalized = value.round_dp(SCALE);
        normalized.rescale(SCALE);
        normalized.set_sign_positive(true);

        if normalized.mantissa() > i64::MAX as i128 {
            return Err(MoneyError::Overflow);
        }
        Ok(Money(normalized))
    }
}

impl TryFrom<i64> for Money {
    type Error = MoneyError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Money::from_cents(cents)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| MoneyError::Parse(s.to_string()))?;
        Money::try_from(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money(iter.fold(Decimal::new(0, SCALE), |acc, m| acc + m.0))
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
