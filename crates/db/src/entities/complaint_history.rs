//! Complaint history entity.
//!
//! Immutable audit entries, one per status transition. The creation entry
//! has `old_status = None`; system-initiated changes have `changed_by = None`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::complaint::Status;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub complaint_id: String,

    /// Status before the transition; None for the creation entry.
    #[sea_orm(nullable)]
    pub old_status: Option<Status>,

    pub new_status: Status,

    /// Free-text note attached to the transition.
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,

    /// Acting user ID; None for system-initiated transitions.
    #[sea_orm(nullable)]
    pub changed_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::complaint::Entity",
        from = "Column::ComplaintId",
        to = "super::complaint::Column::Id"
    )]
    Complaint,
}

impl Related<super::complaint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
