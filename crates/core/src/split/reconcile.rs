//! Share reconciliation.
//!
//! Produces the complete share set for an expense, either from an explicit
//! submission or by recomputing an equal split across the group. The result
//! always sums to the expense amount; the caller persists it in the same
//! unit of work as the expense itself, discarding every prior share.

use std::collections::HashSet;

use serde::Deserialize;
use splitledger_shared::types::{Money, UserId};

use super::allocation::{Allocation, allocate};
use super::error::SplitError;

/// One explicitly supplied share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShareInput {
    /// The member who owes this portion.
    pub user_id: UserId,
    /// The portion, already quantized to cents.
    pub amount: Money,
}

/// Whether shares are reconciled for a new or an existing expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Expense creation; every supplied share must be positive.
    Create,
    /// Expense update; only membership, uniqueness and the sum are checked.
    Update,
}

/// Validates an expense amount.
///
/// # Errors
///
/// Returns [`SplitError::NonPositiveAmount`] if `amount <= 0` and
/// [`SplitError::AmountOutOfRange`] if it does not fit in minor units.
pub fn validate_expense_amount(amount: Money) -> Result<(), SplitError> {
    if !amount.is_positive() {
        return Err(SplitError::NonPositiveAmount(amount));
    }
    ensure_in_range(amount)
}

fn ensure_in_range(amount: Money) -> Result<(), SplitError> {
    match amount.to_minor_units() {
        Some(_) => Ok(()),
        None => Err(SplitError::AmountOutOfRange(amount)),
    }
}

/// Builds the share set that replaces an expense's current shares.
///
/// With `explicit == None` the amount is split equally across
/// `group_member_ids` in the given (membership) order. Otherwise the
/// submission is validated and returned in submission order.
///
/// # Errors
///
/// - [`SplitError::EmptyGroup`] when splitting equally across no members
/// - [`SplitError::NonPositiveShare`] for a share `<= 0` in [`ReconcileMode::Create`]
/// - [`SplitError::ForeignMember`] for a user outside the group
/// - [`SplitError::DuplicateShareUser`] when a user is listed twice
/// - [`SplitError::AmountOutOfRange`] when a share is too large to store or the sum overflows
/// - [`SplitError::AmountMismatch`] when the shares do not sum to `expense_amount`
pub fn reconcile(
    expense_amount: Money,
    group_member_ids: &[UserId],
    explicit: Option<&[ShareInput]>,
    mode: ReconcileMode,
) -> Result<Vec<Allocation>, SplitError> {
    let Some(shares) = explicit else {
        return allocate(expense_amount, group_member_ids);
    };

    if mode == ReconcileMode::Create {
        if let Some(share) = shares.iter().find(|s| !s.amount.is_positive()) {
            return Err(SplitError::NonPositiveShare {
                user_id: share.user_id,
                amount: share.amount,
            });
        }
    }

    let members: HashSet<UserId> = group_member_ids.iter().copied().collect();
    let mut seen = HashSet::with_capacity(shares.len());
    let mut total = Money::ZERO;

    for share in shares {
        if !members.contains(&share.user_id) {
            return Err(SplitError::ForeignMember(share.user_id));
        }
        if !seen.insert(share.user_id) {
            return Err(SplitError::DuplicateShareUser(share.user_id));
        }
        ensure_in_range(share.amount)?;
        total = total
            .checked_add(share.amount)
            .ok_or(SplitError::AmountOutOfRange(share.amount))?;
    }

    if total != expense_amount {
        return Err(SplitError::AmountMismatch {
            expected: expense_amount,
            actual: total,
        });
    }

    Ok(shares
        .iter()
        .map(|s| Allocation::new(s.user_id, s.amount))
        .collect())
}
