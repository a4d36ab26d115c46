//! Money type with fixed two-place decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` and always carries exactly two
//! fraction digits, so sums of shares can be compared to totals exactly.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of fraction digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// A monetary amount in a single implicit currency.
///
/// Construction from an arbitrary `Decimal` quantizes to two places using
/// banker's rounding. Serializes as a decimal string such as `"12.30"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero with two fraction digits.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    /// The smallest representable amount (one cent).
    pub const CENT: Self = Self(Decimal::from_parts(1, 0, 0, false, MONEY_SCALE));

    /// Quantizes a decimal to two places (half-even) and wraps it.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Self {
        Self::with_strategy(amount, RoundingStrategy::MidpointNearestEven)
    }

    /// Quantizes a decimal to two places rounding toward zero.
    #[must_use]
    pub fn truncated(amount: Decimal) -> Self {
        Self::with_strategy(amount, RoundingStrategy::ToZero)
    }

    fn with_strategy(amount: Decimal, strategy: RoundingStrategy) -> Self {
        let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, strategy);
        rounded.rescale(MONEY_SCALE);
        Self(rounded)
    }

    /// Builds an amount from a count of minor units (cents).
    #[must_use]
    pub fn from_minor_units(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns the amount as a count of minor units (cents).
    ///
    /// Returns `None` if the amount does not fit in an `i64` (including
    /// values too large to carry two fraction digits).
    #[must_use]
    pub fn to_minor_units(self) -> Option<i64> {
        if self.0.scale() != MONEY_SCALE {
            return None;
        }
        i64::try_from(self.0.mantissa()).ok()
    }

    /// Adds two amounts, returning `None` on decimal overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Returns the inner decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::from_decimal(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<u64> for Money {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim()).map(Self::from_decimal)
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod money_tests;
