//! Receipt error types.

use splitledger_shared::AppError;
use splitledger_shared::types::ExpenseId;
use thiserror::Error;

use crate::storage::StorageError;

/// Receipt operation errors.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Expense has no receipt attached.
    #[error("No receipt attached to this expense")]
    NoReceipt,

    /// Receipt is recorded but the file is gone.
    #[error("Receipt file not found on disk")]
    FileMissing,

    /// Upload carried no filename.
    #[error("No selected file")]
    EmptyFilename,

    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ReceiptError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<ReceiptError> for AppError {
    fn from(err: ReceiptError) -> Self {
        match &err {
            ReceiptError::ExpenseNotFound(_)
            | ReceiptError::NoReceipt
            | ReceiptError::FileMissing
            | ReceiptError::Storage(StorageError::NotFound { .. }) => {
                Self::NotFound(err.to_string())
            }
            ReceiptError::EmptyFilename
            | ReceiptError::Storage(
                StorageError::FileTooLarge { .. } | StorageError::InvalidFilename(_),
            ) => Self::Validation(err.to_string()),
            ReceiptError::Storage(_) => Self::Internal(err.to_string()),
            ReceiptError::Repository(msg) => Self::Database(msg.clone()),
        }
    }
}
