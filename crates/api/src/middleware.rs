//! API middleware.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use campussync_common::{LocalStorage, config::UploadConfig};
use campussync_core::{ComplaintService, LifecycleService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Registration and authentication.
    pub user_service: UserService,
    /// Complaint submission, retrieval, and administration.
    pub complaint_service: ComplaintService,
    /// Status transitions.
    pub lifecycle_service: LifecycleService,
    /// Uploaded image storage.
    pub storage: Arc<LocalStorage>,
    /// Upload validation settings.
    pub upload: UploadConfig,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stores it in request
/// extensions; handlers opt in via the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
