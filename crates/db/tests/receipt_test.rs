//! Integration tests for the receipt repository behind the receipt service.

mod common;

use std::sync::Arc;

use common::{group_with_members, money, setup};
use rust_decimal_macros::dec;
use splitledger_core::receipt::{ReceiptError, ReceiptRepository as _, ReceiptService};
use splitledger_core::storage::{ReceiptStorage, StorageConfig, StorageProvider};
use splitledger_db::repositories::{CreateExpenseInput, ExpenseRepository, ReceiptRepository};
use splitledger_shared::types::ExpenseId;

#[tokio::test]
async fn test_receipt_attach_download_remove() {
    let db = setup().await;
    let (group_id, _) = group_with_members(&db, &["A"]).await;
    let expense = ExpenseRepository::new(db.clone())
        .create(
            group_id,
            CreateExpenseInput {
                description: "Parking".to_string(),
                amount: money(dec!(3)),
                paid_by: None,
                expense_date: None,
                shares: None,
            },
        )
        .await
        .unwrap();
    let expense_id = ExpenseId::from_uuid(expense.expense.id);

    let storage = Arc::new(
        ReceiptStorage::from_config(StorageConfig::new(StorageProvider::Memory)).unwrap(),
    );
    let repo = Arc::new(ReceiptRepository::new(db.clone()));
    let service = ReceiptService::new(storage, Arc::clone(&repo));

    let receipt = service
        .attach(expense_id, "ticket.JPG", Some("image/jpeg".to_string()), b"jpg".to_vec())
        .await
        .unwrap();
    assert!(receipt.filename.ends_with(".jpg"));
    assert_eq!(repo.current_receipt(expense_id).await.unwrap(), Some(receipt.clone()));

    let (stored, bytes) = service.download(expense_id).await.unwrap();
    assert_eq!(stored.mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(bytes, b"jpg");

    service.remove(expense_id).await.unwrap();
    assert_eq!(repo.current_receipt(expense_id).await.unwrap(), None);
    assert!(matches!(
        service.download(expense_id).await,
        Err(ReceiptError::NoReceipt)
    ));
}

#[tokio::test]
async fn test_receipt_for_missing_expense() {
    let db = setup().await;
    let repo = ReceiptRepository::new(db.clone());

    assert!(!repo.expense_exists(ExpenseId::new()).await.unwrap());
    assert!(matches!(
        repo.current_receipt(ExpenseId::new()).await,
        Err(ReceiptError::ExpenseNotFound(_))
    ));
}
