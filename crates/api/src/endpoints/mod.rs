//! API endpoints.

mod admin;
mod auth;
mod complaints;
mod staff;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/complaints", complaints::router())
        .nest("/staff", staff::router())
        .nest("/admin", admin::router())
}
