//! Complaint repository.

use std::sync::Arc;

use crate::entities::{
    Complaint, complaint,
    complaint::Status,
    complaint_history,
};
use campussync_common::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a complaint by ID. Soft-deleted complaints are treated as absent.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Complaint::find_by_id(id)
            .filter(complaint::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a complaint by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ComplaintNotFound(id.to_string()))
    }

    /// List complaints filed by the given author, newest first.
    pub async fn find_by_author(&self, user_id: &str) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::UserId.eq(user_id))
            .filter(complaint::Column::IsDeleted.eq(false))
            .order_by_desc(complaint::Column::DatePosted)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List complaints assigned to the given staff user, newest first.
    pub async fn find_by_assignee(&self, staff_id: &str) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::AssignedTo.eq(staff_id))
            .filter(complaint::Column::IsDeleted.eq(false))
            .order_by_desc(complaint::Column::DatePosted)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all complaints, optionally filtered by status, newest first.
    pub async fn find_all(&self, status: Option<Status>) -> AppResult<Vec<complaint::Model>> {
        let mut query = Complaint::find().filter(complaint::Column::IsDeleted.eq(false));

        if let Some(status) = status {
            query = query.filter(complaint::Column::Status.eq(status));
        }

        query
            .order_by_desc(complaint::Column::DatePosted)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List complaints eligible for auto-escalation.
    ///
    /// Eligible means: status neither Resolved nor Escalated, not soft-deleted,
    /// and posted at or before the cutoff.
    pub async fn find_stale(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(
                complaint::Column::Status.is_not_in([Status::Resolved, Status::Escalated]),
            )
            .filter(complaint::Column::IsDeleted.eq(false))
            .filter(complaint::Column::DatePosted.lte(cutoff))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new complaint.
    pub async fn create(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new complaint together with its initial history entry.
    ///
    /// Both rows commit in one transaction; a failure rolls back both.
    pub async fn create_with_history(
        &self,
        complaint: complaint::ActiveModel,
        history: complaint_history::ActiveModel,
    ) -> AppResult<(complaint::Model, complaint_history::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = complaint
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recorded = history
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((created, recorded))
    }

    /// Update a complaint.
    pub async fn update(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a status transition and record its history entry atomically.
    ///
    /// The status update and the history insert run in one transaction;
    /// a failure rolls back both.
    pub async fn transition_with_history(
        &self,
        complaint: complaint::Model,
        new_status: Status,
        history: complaint_history::ActiveModel,
    ) -> AppResult<(complaint::Model, complaint_history::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: complaint::ActiveModel = complaint.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recorded = history
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((updated, recorded))
    }
}
