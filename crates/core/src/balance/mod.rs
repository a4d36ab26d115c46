//! Group balance aggregation.
//!
//! Net position per user across a group's expenses: payers are credited with
//! the full expense amount, and every unsettled share is debited from the
//! share's owner. Settled shares are ignored, as are expenses without a payer
//! (their unsettled shares still count against the owners).

use std::collections::HashMap;

use serde::Serialize;
use splitledger_shared::types::{Money, UserId};

/// One share as seen by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareLedger {
    /// Owner of the share.
    pub user_id: UserId,
    /// Owed portion.
    pub amount: Money,
    /// Whether the share has been marked as paid back.
    pub is_settled: bool,
}

/// One expense as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseLedger {
    /// Payer, if still known.
    pub paid_by: Option<UserId>,
    /// Full expense amount.
    pub amount: Money,
    /// Shares of the expense.
    pub shares: Vec<ShareLedger>,
}

/// Net balance of a single user. Positive means the group owes the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserBalance {
    /// The user.
    pub user_id: UserId,
    /// Net position.
    pub balance: Money,
}

/// Computes net balances over `expenses`.
///
/// Users appear in the order they are first touched: an expense's payer
/// before its shares, expenses in input order. Only users touched by at
/// least one expense are reported; members with no activity are omitted.
pub fn compute_balances<'a, I>(expenses: I) -> Vec<UserBalance>
where
    I: IntoIterator<Item = &'a ExpenseLedger>,
{
    let mut index: HashMap<UserId, usize> = HashMap::new();
    let mut balances: Vec<UserBalance> = Vec::new();

    for expense in expenses {
        if let Some(payer) = expense.paid_by {
            apply(&mut index, &mut balances, payer, expense.amount);
        }
        for share in expense.shares.iter().filter(|s| !s.is_settled) {
            apply(&mut index, &mut balances, share.user_id, -share.amount);
        }
    }

    balances
}

fn apply(
    index: &mut HashMap<UserId, usize>,
    balances: &mut Vec<UserBalance>,
    user_id: UserId,
    delta: Money,
) {
    let slot = *index.entry(user_id).or_insert_with(|| {
        balances.push(UserBalance {
            user_id,
            balance: Money::ZERO,
        });
        balances.len() - 1
    });
    balances[slot].balance += delta;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::allocate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn money(value: rust_decimal::Decimal) -> Money {
        Money::from_decimal(value)
    }

    fn share(user_id: UserId, amount: Money) -> ShareLedger {
        ShareLedger {
            user_id,
            amount,
            is_settled: false,
        }
    }

    fn balance_of(balances: &[UserBalance], user: UserId) -> Money {
        balances
            .iter()
            .find(|b| b.user_id == user)
            .map(|b| b.balance)
            .unwrap()
    }

    #[test]
    fn test_no_expenses() {
        assert!(compute_balances(&Vec::<ExpenseLedger>::new()).is_empty());
    }

    #[test]
    fn test_payer_credited_and_shares_debited() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let expense = ExpenseLedger {
            paid_by: Some(a),
            amount: money(dec!(30)),
            shares: vec![
                share(a, money(dec!(10))),
                share(b, money(dec!(10))),
                share(c, money(dec!(10))),
            ],
        };

        let balances = compute_balances(&[expense]);

        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0].user_id, a);
        assert_eq!(balances[0].balance, money(dec!(20)));
        assert_eq!(balances[1].balance, money(dec!(-10)));
        assert_eq!(balances[2].balance, money(dec!(-10)));
        assert_eq!(balances.iter().map(|b| b.balance).sum::<Money>(), Money::ZERO);
    }

    #[test]
    fn test_settled_shares_are_ignored() {
        let (a, b) = (UserId::new(), UserId::new());
        let expense = ExpenseLedger {
            paid_by: Some(a),
            amount: money(dec!(20)),
            shares: vec![
                share(a, money(dec!(10))),
                ShareLedger {
                    is_settled: true,
                    ..share(b, money(dec!(10)))
                },
            ],
        };

        let balances = compute_balances(&[expense]);

        assert_eq!(balance_of(&balances, a), money(dec!(10)));
        assert_eq!(balances.len(), 1);
    }

    #[test]
    fn test_expense_without_payer_still_debits_shares() {
        let (a, b) = (UserId::new(), UserId::new());
        let expense = ExpenseLedger {
            paid_by: None,
            amount: money(dec!(8)),
            shares: vec![share(b, money(dec!(4))), share(a, money(dec!(4)))],
        };

        let balances = compute_balances(&[expense]);

        assert_eq!(balances[0].user_id, b);
        assert_eq!(balances[0].balance, money(dec!(-4)));
        assert_eq!(balances[1].balance, money(dec!(-4)));
    }

    #[test]
    fn test_first_appearance_order_across_expenses() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let first = ExpenseLedger {
            paid_by: Some(b),
            amount: money(dec!(10)),
            shares: vec![share(a, money(dec!(10)))],
        };
        let second = ExpenseLedger {
            paid_by: Some(c),
            amount: money(dec!(6)),
            shares: vec![share(b, money(dec!(3))), share(c, money(dec!(3)))],
        };

        let balances = compute_balances(&[first, second]);
        let order: Vec<UserId> = balances.iter().map(|b| b.user_id).collect();

        assert_eq!(order, [b, a, c]);
        assert_eq!(balance_of(&balances, b), money(dec!(7)));
        assert_eq!(balance_of(&balances, a), money(dec!(-10)));
        assert_eq!(balance_of(&balances, c), money(dec!(3)));
    }

    proptest! {
        /// With nothing settled and every expense paid and split equally,
        /// balances always net to zero.
        #[test]
        fn prop_unsettled_balances_net_to_zero(
            expenses in prop::collection::vec((1i64..1_000_000i64, 0usize..4, 1usize..5), 1..10),
        ) {
            let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();

            let ledger: Vec<ExpenseLedger> = expenses
                .iter()
                .map(|&(cents, payer, count)| {
                    let amount = Money::from_minor_units(cents);
                    let shares = allocate(amount, &users[..count])
                        .unwrap()
                        .into_iter()
                        .map(|a| share(a.user_id, a.amount))
                        .collect();
                    ExpenseLedger { paid_by: Some(users[payer]), amount, shares }
                })
                .collect();

            let balances = compute_balances(&ledger);
            prop_assert_eq!(balances.iter().map(|b| b.balance).sum::<Money>(), Money::ZERO);
        }
    }
}
