//! # Money
//!
//! Exact amounts with two fractional digits, the decimal(18,2) domain.
//!
//! - Stored as a count of hundredths in an `INTEGER` column
//! - Serialized as a decimal string such as `"12.50"`
//! - Deserialized from JSON numbers or decimal strings, rounded to two places
//! - All arithmetic is checked, leaving the domain is [`MoneyError::OutOfRange`]
use std::{
    fmt,
    ops::Neg,
};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use thiserror::Error;

/// 16 integer digits and 2 fractional digits.
const MAX_CENTS: i64 = 999_999_999_999_999_999;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount out of range")]
    OutOfRange,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents.checked_abs().is_none_or(|abs| abs > MAX_CENTS) {
            return Err(MoneyError::OutOfRange);
        }

        Ok(Self(cents))
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .ok_or(MoneyError::OutOfRange)
            .and_then(Self::from_cents)
    }

    pub fn checked_sub(self, other: Money) -> Result<Self, MoneyError> {
        self.0
            .checked_sub(other.0)
            .ok_or(MoneyError::OutOfRange)
            .and_then(Self::from_cents)
    }

    /// Price of `quantity` units. Negative quantities give negative amounts,
    /// which is how quantity decreases are expressed as deltas.
    pub fn times(self, quantity: i32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(i64::from(quantity))
            .ok_or(MoneyError::OutOfRange)
            .and_then(Self::from_cents)
    }

    /// Sum of `price × quantity` over order or cart lines.
    pub fn total<I>(lines: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = (Money, i32)>,
    {
        lines
            .into_iter()
            .try_fold(Money::ZERO, |sum, (price, quantity)| {
                sum.checked_add(price.times(quantity)?)
            })
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::OutOfRange)?
            .round()
            .to_i64()
            .ok_or(MoneyError::OutOfRange)?;

        Self::from_cents(cents)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        // symmetric domain, cannot overflow
        Money(-self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.as_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;

        Money::try_from(value).map_err(D::Error::custom)
    }
}
