//! Equal-split allocation.
//!
//! Divides an amount across an ordered list of members so that the sum of
//! the parts is exactly the total:
//! 1. Every member gets the total divided by N, rounded down to the cent
//! 2. The leftover cents (always fewer than N) go one each to the first members

use rust_decimal::Decimal;
use serde::Serialize;
use splitledger_shared::types::{Money, UserId};

use super::error::SplitError;

/// A member's portion of a split amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// The member the amount is attributed to.
    pub user_id: UserId,
    /// The member's portion.
    pub amount: Money,
}

impl Allocation {
    /// Creates a new allocation.
    #[must_use]
    pub const fn new(user_id: UserId, amount: Money) -> Self {
        Self { user_id, amount }
    }
}

/// Splits `total` equally across `member_ids`.
///
/// The remainder cents are handed out in input order, so callers must pass a
/// stable ordering (membership order). Amounts in the result never differ by
/// more than one cent and always sum to `total`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use splitledger_core::split::allocate;
/// use splitledger_shared::types::{Money, UserId};
///
/// let members = [UserId::new(), UserId::new(), UserId::new()];
/// let parts = allocate(Money::from_decimal(dec!(10)), &members).unwrap();
/// let amounts: Vec<String> = parts.iter().map(|p| p.amount.to_string()).collect();
/// assert_eq!(amounts, ["3.34", "3.33", "3.33"]);
/// ```
///
/// # Errors
///
/// Returns [`SplitError::EmptyGroup`] when `member_ids` is empty,
/// [`SplitError::NegativeTotal`] when `total` is below zero and
/// [`SplitError::AmountOutOfRange`] when `total` does not fit in minor units.
pub fn allocate(total: Money, member_ids: &[UserId]) -> Result<Vec<Allocation>, SplitError> {
    if member_ids.is_empty() {
        return Err(SplitError::EmptyGroup);
    }
    if total.is_negative() {
        return Err(SplitError::NegativeTotal(total));
    }
    if total.to_minor_units().is_none() {
        return Err(SplitError::AmountOutOfRange(total));
    }

    let count = member_ids.len() as u64;

    // Round down to get base allocation
    let base = Money::truncated(total.amount() / Decimal::from(count));

    // Leftover cents, 0 <= remainder < count
    let remainder = total - base * count;
    let extra_count = remainder
        .to_minor_units()
        .and_then(|cents| usize::try_from(cents).ok())
        .ok_or(SplitError::AmountOutOfRange(remainder))?;

    // Distribute: first N members get an extra cent
    Ok(member_ids
        .iter()
        .enumerate()
        .map(|(i, user_id)| {
            let amount = if i < extra_count {
                base + Money::CENT
            } else {
                base
            };
            Allocation::new(*user_id, amount)
        })
        .collect())
}
