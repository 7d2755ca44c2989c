//! Business logic services.

pub mod authorization;
pub mod complaint;
pub mod escalation;
pub mod lifecycle;
pub mod user;

pub use authorization::{can_edit, can_update_status, can_view};
pub use complaint::{ComplaintService, CreateComplaintInput, UpdateComplaintInput};
pub use escalation::EscalationService;
pub use lifecycle::{Actor, LifecycleService};
pub use user::{RegisterInput, UserService};
