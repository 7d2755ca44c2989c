//! Authorization predicates over roles and complaints.
//!
//! Pure functions; callers map a `false` to a 403. Soft-deleted and
//! nonexistent complaints must be resolved to a 404 before these apply.

use campussync_db::entities::{complaint, complaint::Status, user, user::Role};

/// Whether the user may view the complaint: its author, its current
/// assignee, or an admin.
#[must_use]
pub fn can_view(user: &user::Model, complaint: &complaint::Model) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Staff => complaint.assigned_to.as_deref() == Some(user.id.as_str()),
        Role::Student | Role::Citizen => complaint.user_id == user.id,
    }
}

/// Whether the user may edit the complaint's content fields: the author
/// only, and only while the complaint is still Pending.
#[must_use]
pub fn can_edit(user: &user::Model, complaint: &complaint::Model) -> bool {
    match user.role {
        Role::Student | Role::Citizen => {
            complaint.user_id == user.id && complaint.status == Status::Pending
        }
        Role::Staff | Role::Admin => false,
    }
}

/// Whether the user may update the complaint's status: the assigned
/// staff member only. Target-status restrictions are enforced by the
/// lifecycle engine.
#[must_use]
pub fn can_update_status(user: &user::Model, complaint: &complaint::Model) -> bool {
    match user.role {
        Role::Staff => complaint.assigned_to.as_deref() == Some(user.id.as_str()),
        Role::Student | Role::Citizen | Role::Admin => false,
    }
}
