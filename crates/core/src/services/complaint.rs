//! Complaint service.

use campussync_common::{AppError, AppResult, IdGenerator};
use campussync_db::{
    entities::{
        complaint,
        complaint::{Priority, Status},
        complaint_history, user,
        user::Role,
    },
    repositories::{ComplaintHistoryRepository, ComplaintRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::authorization::{can_edit, can_view};

/// Complaint service for submission, retrieval, and administration.
#[derive(Clone)]
pub struct ComplaintService {
    complaint_repo: ComplaintRepository,
    history_repo: ComplaintHistoryRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for filing a new complaint.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComplaintInput {
    // Length caps match the column widths in the complaint table
    #[validate(length(min = 1, max = 128))]
    pub title: String,

    #[validate(length(min = 1, max = 64))]
    pub category: String,

    #[validate(length(min = 1, max = 8192))]
    pub description: String,

    pub priority: Priority,

    #[validate(length(min = 1, max = 128))]
    pub location: String,

    /// Stored filename of the uploaded image, if any.
    pub image_file: Option<String>,
}

/// Input for editing a complaint's content fields.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateComplaintInput {
    #[validate(length(min = 1, max = 128))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,

    #[validate(length(min = 1, max = 8192))]
    pub description: Option<String>,

    pub priority: Option<Priority>,

    #[validate(length(min = 1, max = 128))]
    pub location: Option<String>,

    pub image_file: Option<String>,
}

impl ComplaintService {
    /// Create a new complaint service.
    #[must_use]
    pub fn new(
        complaint_repo: ComplaintRepository,
        history_repo: ComplaintHistoryRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            complaint_repo,
            history_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a new complaint. Starts as Pending with one creation history
    /// entry; both rows commit atomically.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateComplaintInput,
    ) -> AppResult<complaint::Model> {
        if !author.role.is_reporter() {
            return Err(AppError::Forbidden(
                "Only students and citizens may file complaints".to_string(),
            ));
        }

        input.validate()?;

        let complaint_id = self.id_gen.generate();
        let now = chrono::Utc::now();

        let model = complaint::ActiveModel {
            id: Set(complaint_id.clone()),
            title: Set(input.title),
            category: Set(input.category),
            description: Set(input.description),
            priority: Set(input.priority),
            location: Set(input.location),
            image_file: Set(input.image_file),
            status: Set(Status::Pending),
            user_id: Set(author.id.clone()),
            assigned_to: Set(None),
            is_deleted: Set(false),
            date_posted: Set(now.into()),
            ..Default::default()
        };

        let history = complaint_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            complaint_id: Set(complaint_id),
            old_status: Set(None),
            new_status: Set(Status::Pending),
            note: Set(None),
            changed_by: Set(Some(author.id.clone())),
            created_at: Set(now.into()),
        };

        let (created, _) = self.complaint_repo.create_with_history(model, history).await?;
        Ok(created)
    }

    /// Fetch a complaint the user is allowed to view.
    pub async fn get(&self, user: &user::Model, id: &str) -> AppResult<complaint::Model> {
        let complaint = self.complaint_repo.get_by_id(id).await?;

        if !can_view(user, &complaint) {
            return Err(AppError::Forbidden(
                "You may not view this complaint".to_string(),
            ));
        }

        Ok(complaint)
    }

    /// Edit a complaint's content fields. Author only, Pending only.
    pub async fn edit(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateComplaintInput,
    ) -> AppResult<complaint::Model> {
        input.validate()?;

        let complaint = self.complaint_repo.get_by_id(id).await?;

        if !can_edit(user, &complaint) {
            return Err(AppError::Forbidden(
                "Only the author may edit a pending complaint".to_string(),
            ));
        }

        let mut active: complaint::ActiveModel = complaint.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(image_file) = input.image_file {
            active.image_file = Set(Some(image_file));
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.complaint_repo.update(active).await
    }

    /// List the user's own complaints, newest first.
    pub async fn list_own(&self, user: &user::Model) -> AppResult<Vec<complaint::Model>> {
        self.complaint_repo.find_by_author(&user.id).await
    }

    /// List complaints assigned to a staff user, newest first.
    pub async fn list_assigned(&self, staff: &user::Model) -> AppResult<Vec<complaint::Model>> {
        self.complaint_repo.find_by_assignee(&staff.id).await
    }

    /// List all complaints, optionally filtered by status. Admin only.
    pub async fn list_all(
        &self,
        admin: &user::Model,
        status: Option<Status>,
    ) -> AppResult<Vec<complaint::Model>> {
        require_admin(admin)?;
        self.complaint_repo.find_all(status).await
    }

    /// Audit trail for a complaint the user is allowed to view.
    pub async fn history(
        &self,
        user: &user::Model,
        id: &str,
    ) -> AppResult<Vec<complaint_history::Model>> {
        let complaint = self.complaint_repo.get_by_id(id).await?;

        if !can_view(user, &complaint) {
            return Err(AppError::Forbidden(
                "You may not view this complaint".to_string(),
            ));
        }

        self.history_repo.find_by_complaint(&complaint.id).await
    }

    /// Assign a complaint to a staff user. Admin only; the assignee must
    /// hold the staff role.
    pub async fn assign(
        &self,
        admin: &user::Model,
        id: &str,
        staff_id: &str,
    ) -> AppResult<complaint::Model> {
        require_admin(admin)?;

        let complaint = self.complaint_repo.get_by_id(id).await?;
        let assignee = self.user_repo.get_by_id(staff_id).await?;

        if assignee.role != Role::Staff {
            return Err(AppError::BadRequest(
                "Assignee must be a staff user".to_string(),
            ));
        }

        let mut active: complaint::ActiveModel = complaint.into();
        active.assigned_to = Set(Some(assignee.id));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.complaint_repo.update(active).await
    }

    /// Soft-delete a complaint. Admin only. The row is hidden from every
    /// listing and returns not-found on direct access.
    pub async fn soft_delete(&self, admin: &user::Model, id: &str) -> AppResult<()> {
        require_admin(admin)?;

        let complaint = self.complaint_repo.get_by_id(id).await?;

        let mut active: complaint::ActiveModel = complaint.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.complaint_repo.update(active).await?;
        Ok(())
    }
}

fn require_admin(user: &user::Model) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Student | Role::Citizen | Role::Staff => Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
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

    fn test_complaint(id: &str, author: &str, status: Status) -> complaint::Model {
        complaint::Model {
            id: id.to_string(),
            title: "Flickering corridor light".to_string(),
            category: "Electricity".to_string(),
            description: "Corridor light on floor 3 flickers".to_string(),
            priority: Priority::Medium,
            location: "Block A, floor 3".to_string(),
            image_file: None,
            status,
            user_id: author.to_string(),
            assigned_to: None,
            is_deleted: false,
            date_posted: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> ComplaintService {
        ComplaintService::new(
            ComplaintRepository::new(db.clone()),
            ComplaintHistoryRepository::new(db.clone()),
            UserRepository::new(db),
        )
    }

    fn valid_input() -> CreateComplaintInput {
        CreateComplaintInput {
            title: "Flickering corridor light".to_string(),
            category: "Electricity".to_string(),
            description: "Corridor light on floor 3 flickers".to_string(),
            priority: Priority::Medium,
            location: "Block A, floor 3".to_string(),
            image_file: None,
        }
    }

    #[tokio::test]
    async fn test_create_records_pending_with_history() {
        let author = test_user("alice", Role::Student);
        let created = test_complaint("c1", "alice", Status::Pending);
        let history = complaint_history::Model {
            id: "h1".to_string(),
            complaint_id: "c1".to_string(),
            old_status: None,
            new_status: Status::Pending,
            note: None,
            changed_by: Some("alice".to_string()),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .append_query_results([[history]])
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
        let result = service.create(&author, valid_input()).await.unwrap();

        assert_eq!(result.status, Status::Pending);
        assert_eq!(result.user_id, "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_title_wider_than_column() {
        let author = test_user("alice", Role::Student);

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let mut input = valid_input();
        input.title = "x".repeat(129);

        let result = service.create(&author, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_edit_rejects_location_wider_than_column() {
        let author = test_user("alice", Role::Student);

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let input = UpdateComplaintInput {
            location: Some("x".repeat(129)),
            ..UpdateComplaintInput::default()
        };

        let result = service.edit(&author, "c1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_staff_cannot_file_complaints() {
        let staff = test_user("staff1", Role::Staff);

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.create(&staff, valid_input()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_denies_other_student() {
        let other = test_user("bob", Role::Student);
        let complaint = test_complaint("c1", "alice", Status::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.get(&other, "c1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let user = test_user("alice", Role::Student);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<complaint::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.get(&user, "missing").await;

        assert!(matches!(result, Err(AppError::ComplaintNotFound(_))));
    }

    #[tokio::test]
    async fn test_edit_denied_after_pending() {
        let author = test_user("alice", Role::Student);
        let complaint = test_complaint("c1", "alice", Status::InProgress);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .edit(&author, "c1", UpdateComplaintInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_assign_rejects_non_staff_assignee() {
        let admin = test_user("admin1", Role::Admin);
        let complaint = test_complaint("c1", "alice", Status::Pending);
        let assignee = test_user("bob", Role::Student);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .append_query_results([[assignee]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.assign(&admin, "c1", "bob").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_assign_requires_admin() {
        let staff = test_user("staff1", Role::Staff);

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.assign(&staff, "c1", "staff2").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_all_requires_admin() {
        let student = test_user("alice", Role::Student);

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.list_all(&student, None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_marks_row() {
        let admin = test_user("admin1", Role::Admin);
        let complaint = test_complaint("c1", "alice", Status::Pending);

        let mut deleted = complaint.clone();
        deleted.is_deleted = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint]])
                .append_query_results([[deleted]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        service.soft_delete(&admin, "c1").await.unwrap();
    }
}
