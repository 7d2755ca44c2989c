//! Complaint history repository.

use std::sync::Arc;

use crate::entities::{ComplaintHistory, complaint_history};
use campussync_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Complaint history repository for database operations.
#[derive(Clone)]
pub struct ComplaintHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintHistoryRepository {
    /// Create a new complaint history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List history entries for a complaint, oldest first.
    pub async fn find_by_complaint(
        &self,
        complaint_id: &str,
    ) -> AppResult<Vec<complaint_history::Model>> {
        ComplaintHistory::find()
            .filter(complaint_history::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(complaint_history::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a history entry.
    pub async fn create(
        &self,
        model: complaint_history::ActiveModel,
    ) -> AppResult<complaint_history::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
