//! Receipt service implementation.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use splitledger_shared::types::ExpenseId;
use tracing::info;

use super::error::ReceiptError;
use crate::storage::{ReceiptStorage, StorageError};

/// Reference to a stored receipt, as recorded on the expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptRef {
    /// Generated storage name.
    pub filename: String,
    /// MIME type reported at upload.
    pub mime_type: Option<String>,
}

/// Repository trait for the receipt fields of an expense.
///
/// Implemented by the db crate.
pub trait ReceiptRepository: Send + Sync {
    /// Check if an expense exists.
    fn expense_exists(
        &self,
        expense_id: ExpenseId,
    ) -> impl Future<Output = Result<bool, ReceiptError>> + Send;

    /// Current receipt of an expense, if any.
    fn current_receipt(
        &self,
        expense_id: ExpenseId,
    ) -> impl Future<Output = Result<Option<ReceiptRef>, ReceiptError>> + Send;

    /// Record (or clear) the receipt of an expense.
    fn set_receipt(
        &self,
        expense_id: ExpenseId,
        receipt: Option<ReceiptRef>,
    ) -> impl Future<Output = Result<(), ReceiptError>> + Send;
}

/// Service tying receipt files to expenses.
pub struct ReceiptService<R: ReceiptRepository> {
    storage: Arc<ReceiptStorage>,
    repo: Arc<R>,
}

impl<R: ReceiptRepository> ReceiptService<R> {
    /// Create a new receipt service.
    #[must_use]
    pub fn new(storage: Arc<ReceiptStorage>, repo: Arc<R>) -> Self {
        Self { storage, repo }
    }

    /// Store a file and attach it to an expense.
    ///
    /// The previous receipt file, if any, is removed after the new reference
    /// is recorded. Failing to remove it is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Expense does not exist
    /// - Filename is empty or unusable
    /// - File size exceeds limit
    /// - Storage or repository fails
    pub async fn attach(
        &self,
        expense_id: ExpenseId,
        original_filename: &str,
        mime_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Result<ReceiptRef, ReceiptError> {
        if !self.repo.expense_exists(expense_id).await? {
            return Err(ReceiptError::ExpenseNotFound(expense_id));
        }
        if original_filename.is_empty() {
            return Err(ReceiptError::EmptyFilename);
        }

        let previous = self.repo.current_receipt(expense_id).await?;
        let filename = self.storage.save(original_filename, bytes).await?;
        let receipt = ReceiptRef {
            filename,
            mime_type: mime_type.filter(|m| !m.is_empty()),
        };

        if let Err(e) = self
            .repo
            .set_receipt(expense_id, Some(receipt.clone()))
            .await
        {
            self.storage.remove_best_effort(&receipt.filename).await;
            return Err(e);
        }

        if let Some(old) = previous {
            self.storage.remove_best_effort(&old.filename).await;
        }

        info!(expense_id = %expense_id, filename = %receipt.filename, "Receipt attached");
        Ok(receipt)
    }

    /// Load the receipt of an expense together with its bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense does not exist, has no receipt, or
    /// the file is missing from storage.
    pub async fn download(
        &self,
        expense_id: ExpenseId,
    ) -> Result<(ReceiptRef, Vec<u8>), ReceiptError> {
        let receipt = self.require_receipt(expense_id).await?;

        match self.storage.read(&receipt.filename).await {
            Ok(bytes) => Ok((receipt, bytes)),
            Err(StorageError::NotFound { .. }) => Err(ReceiptError::FileMissing),
            Err(e) => Err(e.into()),
        }
    }

    /// Detach the receipt of an expense and remove its file.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense does not exist, has no receipt, or
    /// the repository update fails.
    pub async fn remove(&self, expense_id: ExpenseId) -> Result<(), ReceiptError> {
        let receipt = self.require_receipt(expense_id).await?;

        self.storage.remove_best_effort(&receipt.filename).await;
        self.repo.set_receipt(expense_id, None).await?;

        info!(expense_id = %expense_id, "Receipt removed");
        Ok(())
    }

    async fn require_receipt(&self, expense_id: ExpenseId) -> Result<ReceiptRef, ReceiptError> {
        if !self.repo.expense_exists(expense_id).await? {
            return Err(ReceiptError::ExpenseNotFound(expense_id));
        }
        self.repo
            .current_receipt(expense_id)
            .await?
            .ok_or(ReceiptError::NoReceipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageConfig, StorageProvider};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock repository for testing.
    #[derive(Default)]
    struct MockReceiptRepository {
        expenses: Mutex<HashMap<ExpenseId, Option<ReceiptRef>>>,
    }

    impl MockReceiptRepository {
        fn with_expense(id: ExpenseId) -> Self {
            let repo = Self::default();
            repo.expenses.lock().unwrap().insert(id, None);
            repo
        }
    }

    impl ReceiptRepository for MockReceiptRepository {
        async fn expense_exists(&self, expense_id: ExpenseId) -> Result<bool, ReceiptError> {
            Ok(self.expenses.lock().unwrap().contains_key(&expense_id))
        }

        async fn current_receipt(
            &self,
            expense_id: ExpenseId,
        ) -> Result<Option<ReceiptRef>, ReceiptError> {
            Ok(self
                .expenses
                .lock()
                .unwrap()
                .get(&expense_id)
                .cloned()
                .flatten())
        }

        async fn set_receipt(
            &self,
            expense_id: ExpenseId,
            receipt: Option<ReceiptRef>,
        ) -> Result<(), ReceiptError> {
            self.expenses.lock().unwrap().insert(expense_id, receipt);
            Ok(())
        }
    }

    fn service(repo: MockReceiptRepository) -> (ReceiptService<MockReceiptRepository>, Arc<ReceiptStorage>) {
        let config = StorageConfig::new(StorageProvider::Memory).with_max_file_size(64);
        let storage = Arc::new(ReceiptStorage::from_config(config).unwrap());
        (ReceiptService::new(Arc::clone(&storage), Arc::new(repo)), storage)
    }

    #[tokio::test]
    async fn test_attach_expense_not_found() {
        let (service, _) = service(MockReceiptRepository::default());

        let result = service
            .attach(ExpenseId::new(), "a.png", None, b"x".to_vec())
            .await;
        assert!(matches!(result, Err(ReceiptError::ExpenseNotFound(_))));
    }

    #[tokio::test]
    async fn test_attach_empty_filename() {
        let id = ExpenseId::new();
        let (service, _) = service(MockReceiptRepository::with_expense(id));

        let result = service.attach(id, "", None, b"x".to_vec()).await;
        assert!(matches!(result, Err(ReceiptError::EmptyFilename)));
    }

    #[tokio::test]
    async fn test_attach_replaces_previous_file() {
        let id = ExpenseId::new();
        let (service, storage) = service(MockReceiptRepository::with_expense(id));

        let first = service
            .attach(id, "one.PDF", Some("application/pdf".into()), b"1".to_vec())
            .await
            .unwrap();
        let second = service
            .attach(id, "two.png", Some("image/png".into()), b"2".to_vec())
            .await
            .unwrap();

        assert!(first.filename.ends_with(".pdf"));
        assert!(!storage.exists(&first.filename).await);
        assert!(storage.exists(&second.filename).await);

        let (receipt, bytes) = service.download(id).await.unwrap();
        assert_eq!(receipt, second);
        assert_eq!(bytes, b"2");
    }

    #[tokio::test]
    async fn test_attach_oversize_file() {
        let id = ExpenseId::new();
        let (service, _) = service(MockReceiptRepository::with_expense(id));

        let result = service.attach(id, "big.bin", None, vec![0u8; 65]).await;
        assert!(matches!(
            result,
            Err(ReceiptError::Storage(StorageError::FileTooLarge { .. }))
        ));
    }

    #[tokio::test]
    async fn test_download_without_receipt() {
        let id = ExpenseId::new();
        let (service, _) = service(MockReceiptRepository::with_expense(id));

        assert!(matches!(
            service.download(id).await,
            Err(ReceiptError::NoReceipt)
        ));
    }

    #[tokio::test]
    async fn test_download_file_missing() {
        let id = ExpenseId::new();
        let (service, storage) = service(MockReceiptRepository::with_expense(id));

        let receipt = service.attach(id, "a.txt", None, b"a".to_vec()).await.unwrap();
        storage.delete(&receipt.filename).await.unwrap();

        assert!(matches!(
            service.download(id).await,
            Err(ReceiptError::FileMissing)
        ));
    }

    #[tokio::test]
    async fn test_remove_clears_receipt() {
        let id = ExpenseId::new();
        let (service, storage) = service(MockReceiptRepository::with_expense(id));

        let receipt = service.attach(id, "a.txt", Some(String::new()), b"a".to_vec()).await.unwrap();
        assert_eq!(receipt.mime_type, None);

        service.remove(id).await.unwrap();

        assert!(!storage.exists(&receipt.filename).await);
        assert!(matches!(service.remove(id).await, Err(ReceiptError::NoReceipt)));
    }
}
