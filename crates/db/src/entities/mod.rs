//! Database entities.

pub mod complaint;
pub mod complaint_history;
pub mod user;

pub use complaint::Entity as Complaint;
pub use complaint_history::Entity as ComplaintHistory;
pub use user::Entity as User;
