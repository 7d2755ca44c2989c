//! Core business logic for campussync.

pub mod services;

pub use services::*;
