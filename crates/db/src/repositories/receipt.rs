//! Receipt fields of expenses, backing the core receipt service.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use splitledger_core::receipt::{ReceiptError, ReceiptRef, ReceiptRepository as ReceiptRepoTrait};
use splitledger_shared::types::ExpenseId;

use crate::entities::expenses;

/// Receipt repository implementation.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    db: DatabaseConnection,
}

impl ReceiptRepository {
    /// Create a new receipt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, expense_id: ExpenseId) -> Result<Option<expenses::Model>, ReceiptError> {
        expenses::Entity::find_by_id(expense_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| ReceiptError::repository(e.to_string()))
    }
}

impl ReceiptRepoTrait for ReceiptRepository {
    async fn expense_exists(&self, expense_id: ExpenseId) -> Result<bool, ReceiptError> {
        Ok(self.find(expense_id).await?.is_some())
    }

    async fn current_receipt(
        &self,
        expense_id: ExpenseId,
    ) -> Result<Option<ReceiptRef>, ReceiptError> {
        let expense = self
            .find(expense_id)
            .await?
            .ok_or(ReceiptError::ExpenseNotFound(expense_id))?;

        Ok(expense.receipt_filename.map(|filename| ReceiptRef {
            filename,
            mime_type: expense.receipt_mime_type,
        }))
    }

    async fn set_receipt(
        &self,
        expense_id: ExpenseId,
        receipt: Option<ReceiptRef>,
    ) -> Result<(), ReceiptError> {
        let expense = self
            .find(expense_id)
            .await?
            .ok_or(ReceiptError::ExpenseNotFound(expense_id))?;

        let (filename, mime_type) = match receipt {
            Some(r) => (Some(r.filename), r.mime_type),
            None => (None, None),
        };

        let mut active = expense.into_active_model();
        active.receipt_filename = Set(filename);
        active.receipt_mime_type = Set(mime_type);
        active.updated_at = Set(chrono::Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| ReceiptError::repository(e.to_string()))?;

        Ok(())
    }
}
