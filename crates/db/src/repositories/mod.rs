//! Repository layer for database operations.

pub mod complaint;
pub mod complaint_history;
pub mod user;

pub use complaint::ComplaintRepository;
pub use complaint_history::ComplaintHistoryRepository;
pub use user::UserRepository;
