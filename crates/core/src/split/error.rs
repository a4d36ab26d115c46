//! Split validation errors.

use splitledger_shared::types::{Money, UserId};
use thiserror::Error;

/// Errors raised while allocating or reconciling expense shares.
///
/// Every variant is a caller-input error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// An equal split was requested for a group without members.
    #[error("Cannot split expense: the group has no members")]
    EmptyGroup,

    /// A negative total cannot be split.
    #[error("Cannot split a negative amount: {0}")]
    NegativeTotal(Money),

    /// Expense amounts must be strictly positive.
    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    /// A share references a user outside the expense's group.
    #[error("user_id {0} is not a member of the group")]
    ForeignMember(UserId),

    /// A supplied share amount is zero or negative.
    #[error("Share amount must be positive (user_id {user_id}: {amount})")]
    NonPositiveShare {
        /// The user the share was supplied for.
        user_id: UserId,
        /// The rejected amount.
        amount: Money,
    },

    /// An amount too large to be stored in minor units, or a share set
    /// whose sum overflows.
    #[error("Amount is out of range: {0}")]
    AmountOutOfRange(Money),

    /// The same user appears more than once in one share submission.
    #[error("user_id {0} appears more than once in shares")]
    DuplicateShareUser(UserId),

    /// Supplied shares do not add up to the expense amount.
    #[error("Sum of shares must equal the expense amount (expected {expected}, got {actual})")]
    AmountMismatch {
        /// The expense amount.
        expected: Money,
        /// The sum of supplied shares.
        actual: Money,
    },
}
