//! HTTP API layer for campussync.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, complaints, staff dashboard, admin
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token lookup, logging, CORS, upload size limit
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
