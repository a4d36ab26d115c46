//! Integration tests for Balance repository.

mod common;

use common::{group_with_members, money, setup};
use rust_decimal_macros::dec;
use splitledger_db::repositories::{
    BalanceError, BalanceRepository, BalanceWithUser, CreateExpenseInput, ExpenseRepository,
};
use splitledger_shared::types::{ExpenseId, GroupId, Money, ShareId, UserId};

fn as_pairs(rows: &[BalanceWithUser]) -> Vec<(UserId, Money)> {
    rows.iter()
        .map(|b| (b.balance.user_id, b.balance.balance))
        .collect()
}

#[tokio::test]
async fn test_group_balances_after_settlement() {
    let db = setup().await;
    let (group_id, ids) = group_with_members(&db, &["Payer", "Debtor", "Other"]).await;
    let expenses = ExpenseRepository::new(db.clone());
    let balances = BalanceRepository::new(db.clone());

    let created = expenses
        .create(
            group_id,
            CreateExpenseInput {
                description: "Hotel".to_string(),
                amount: money(dec!(30)),
                paid_by: Some(ids[0]),
                expense_date: None,
                shares: None,
            },
        )
        .await
        .unwrap();

    let before = balances.group_balances(group_id).await.unwrap();
    assert_eq!(
        as_pairs(&before),
        [
            (ids[0], money(dec!(20))),
            (ids[1], money(dec!(-10))),
            (ids[2], money(dec!(-10))),
        ]
    );
    assert_eq!(before[0].user.as_ref().map(|u| u.name.as_str()), Some("Payer"));

    let debtor_share = created
        .shares
        .iter()
        .find(|s| s.user_id == ids[1].into_inner())
        .unwrap();
    expenses
        .settle_share(
            ExpenseId::from_uuid(created.expense.id),
            ShareId::from_uuid(debtor_share.id),
        )
        .await
        .unwrap();

    // The settled debtor drops out while the payer keeps the full credit.
    let after = balances.group_balances(group_id).await.unwrap();
    assert_eq!(
        as_pairs(&after),
        [(ids[0], money(dec!(20))), (ids[2], money(dec!(-10)))]
    );
}

#[tokio::test]
async fn test_group_balances_empty_and_missing() {
    let db = setup().await;
    let (group_id, _) = group_with_members(&db, &["A"]).await;
    let repo = BalanceRepository::new(db.clone());

    assert!(repo.group_balances(group_id).await.unwrap().is_empty());
    assert!(matches!(
        repo.group_balances(GroupId::new()).await,
        Err(BalanceError::GroupNotFound(_))
    ));
}
