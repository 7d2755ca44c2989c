//! Complaint status lifecycle engine.
//!
//! Every accepted transition updates the complaint and records a history
//! entry in one transaction.

use campussync_common::{AppError, AppResult, IdGenerator};
use campussync_db::{
    entities::{complaint, complaint::Status, complaint_history, user, user::Role},
    repositories::ComplaintRepository,
};
use sea_orm::Set;

/// Who is requesting a status transition.
#[derive(Debug, Clone, Copy)]
pub enum Actor<'a> {
    /// An authenticated user.
    User(&'a user::Model),
    /// The escalation sweep.
    System,
}

/// Lifecycle service applying status transitions.
#[derive(Clone)]
pub struct LifecycleService {
    complaint_repo: ComplaintRepository,
    id_gen: IdGenerator,
}

impl LifecycleService {
    /// Create a new lifecycle service.
    #[must_use]
    pub fn new(complaint_repo: ComplaintRepository) -> Self {
        Self {
            complaint_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply a status transition to a complaint.
    ///
    /// The actor is authorized before the same-status short-circuit, so
    /// a caller who may not touch the complaint is rejected even when no
    /// change would occur. Authorized same-status requests return
    /// `Ok(None)`; otherwise the recorded history entry. Soft-deleted
    /// complaints surface as not-found.
    pub async fn apply_transition(
        &self,
        complaint_id: &str,
        new_status: Status,
        actor: Actor<'_>,
        note: Option<String>,
    ) -> AppResult<Option<complaint_history::Model>> {
        let complaint = self.complaint_repo.get_by_id(complaint_id).await?;

        Self::check_transition(&complaint, new_status, actor)?;

        if complaint.status == new_status {
            return Ok(None);
        }

        let changed_by = match actor {
            Actor::User(user) => Some(user.id.clone()),
            Actor::System => None,
        };

        let history = complaint_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            complaint_id: Set(complaint.id.clone()),
            old_status: Set(Some(complaint.status)),
            new_status: Set(new_status),
            note: Set(note),
            changed_by: Set(changed_by),
            created_at: Set(chrono::Utc::now().into()),
        };

        let (_, recorded) = self
            .complaint_repo
            .transition_with_history(complaint, new_status, history)
            .await?;

        Ok(Some(recorded))
    }

    fn check_transition(
        complaint: &complaint::Model,
        new_status: Status,
        actor: Actor<'_>,
    ) -> AppResult<()> {
        match actor {
            Actor::System => {
                if new_status != Status::Escalated {
                    return Err(AppError::Forbidden(
                        "System transitions are limited to escalation".to_string(),
                    ));
                }
                // Same-status requests fall through to the caller's no-op
                if complaint.status.is_terminal() && complaint.status != new_status {
                    return Err(AppError::Forbidden(
                        "Complaint is no longer eligible for escalation".to_string(),
                    ));
                }
                Ok(())
            }
            Actor::User(user) => match user.role {
                Role::Staff => {
                    if complaint.assigned_to.as_deref() != Some(user.id.as_str()) {
                        return Err(AppError::Forbidden(
                            "Only the assigned staff member may update this complaint"
                                .to_string(),
                        ));
                    }
                    if !matches!(new_status, Status::InProgress | Status::Resolved) {
                        return Err(AppError::Forbidden(
                            "Staff may only move complaints to In Progress or Resolved"
                                .to_string(),
                        ));
                    }
                    if complaint.status.is_terminal() && complaint.status != new_status {
                        return Err(AppError::Forbidden(
                            "Complaint is already in a terminal state".to_string(),
                        ));
                    }
                    Ok(())
                }
                Role::Student | Role::Citizen | Role::Admin => Err(AppError::Forbidden(
                    "This role may not change complaint status".to_string(),
                )),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use campussync_db::entities::complaint::Priority;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@asmedu.org"),
            password_hash: "$argon2id$test".to_string(),
            token: format!("token-{id}"),
            role,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_complaint(
        id: &str,
        author: &str,
        assignee: Option<&str>,
        status: Status,
    ) -> complaint::Model {
        complaint::Model {
            id: id.to_string(),
            title: "Pothole near gate 2".to_string(),
            category: "Roads".to_string(),
            description: "Deep pothole at the service entrance".to_string(),
            priority: Priority::High,
            location: "Gate 2".to_string(),
            image_file: None,
            status,
            user_id: author.to_string(),
            assigned_to: assignee.map(ToString::to_string),
            is_deleted: false,
            date_posted: Utc::now().into(),
            updated_at: None,
        }
    }

    fn history_row(
        complaint_id: &str,
        old: Status,
        new: Status,
        changed_by: Option<&str>,
    ) -> complaint_history::Model {
        complaint_history::Model {
            id: "h1".to_string(),
            complaint_id: complaint_id.to_string(),
            old_status: Some(old),
            new_status: new,
            note: None,
            changed_by: changed_by.map(ToString::to_string),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> LifecycleService {
        LifecycleService::new(ComplaintRepository::new(db))
    }

    #[tokio::test]
    async fn test_same_status_is_a_noop() {
        let complaint = test_complaint("c1", "alice", Some("staff1"), Status::InProgress);
        let staff = test_user("staff1", Role::Staff);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::InProgress, Actor::User(&staff), None)
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_same_status_still_requires_assignee() {
        let complaint = test_complaint("c1", "alice", Some("staff1"), Status::InProgress);
        let other_staff = test_user("staff2", Role::Staff);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::InProgress, Actor::User(&other_staff), None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_same_status_denied_for_reporters() {
        let complaint = test_complaint("c1", "alice", None, Status::Pending);
        let author = test_user("alice", Role::Student);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::Pending, Actor::User(&author), None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_complaint_is_not_found() {
        let staff = test_user("staff1", Role::Staff);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<complaint::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("missing", Status::Resolved, Actor::User(&staff), None)
            .await;

        assert!(matches!(result, Err(AppError::ComplaintNotFound(_))));
    }

    #[tokio::test]
    async fn test_unassigned_staff_is_forbidden() {
        let complaint = test_complaint("c1", "alice", Some("staff1"), Status::Pending);
        let other_staff = test_user("staff2", Role::Staff);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::Resolved, Actor::User(&other_staff), None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_staff_cannot_escalate() {
        let complaint = test_complaint("c1", "alice", Some("staff1"), Status::Pending);
        let staff = test_user("staff1", Role::Staff);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::Escalated, Actor::User(&staff), None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_cannot_change_status() {
        let complaint = test_complaint("c1", "alice", Some("staff1"), Status::Pending);
        let admin = test_user("admin1", Role::Admin);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::Resolved, Actor::User(&admin), None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_assigned_staff_resolves_pending() {
        let complaint = test_complaint("c1", "alice", Some("staff1"), Status::Pending);
        let staff = test_user("staff1", Role::Staff);

        let mut updated = complaint.clone();
        updated.status = Status::Resolved;
        let recorded = history_row("c1", Status::Pending, Status::Resolved, Some("staff1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .append_query_results([[updated]])
                .append_query_results([[recorded]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::Resolved, Actor::User(&staff), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.old_status, Some(Status::Pending));
        assert_eq!(result.new_status, Status::Resolved);
        assert_eq!(result.changed_by.as_deref(), Some("staff1"));
    }

    #[tokio::test]
    async fn test_system_escalates_pending() {
        let complaint = test_complaint("c1", "alice", None, Status::Pending);

        let mut updated = complaint.clone();
        updated.status = Status::Escalated;
        let recorded = history_row("c1", Status::Pending, Status::Escalated, None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .append_query_results([[updated]])
                .append_query_results([[recorded]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::Escalated, Actor::System, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.new_status, Status::Escalated);
        assert!(result.changed_by.is_none());
    }

    #[tokio::test]
    async fn test_system_cannot_escalate_resolved() {
        let complaint = test_complaint("c1", "alice", None, Status::Resolved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .apply_transition("c1", Status::Escalated, Actor::System, None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
