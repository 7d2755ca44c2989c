//! Staff endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use campussync_common::AppResult;
use campussync_core::Actor;
use campussync_db::entities::complaint::Status;
use serde::Deserialize;

use crate::{
    endpoints::complaints::{ComplaintResponse, HistoryResponse},
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Complaints assigned to the calling staff member.
async fn dashboard(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ComplaintResponse>>> {
    let complaints = state.complaint_service.list_assigned(&user).await?;
    Ok(ApiResponse::ok(
        complaints.into_iter().map(Into::into).collect(),
    ))
}

/// Status update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: Status,
    pub note: Option<String>,
}

/// Update the status of an assigned complaint.
///
/// The lifecycle engine enforces assignee and target-status rules; a
/// no-op update (same status) returns no history entry.
async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> AppResult<ApiResponse<Option<HistoryResponse>>> {
    let recorded = state
        .lifecycle_service
        .apply_transition(&id, req.status, Actor::User(&user), req.note)
        .await?;

    Ok(ApiResponse::ok(recorded.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/update/{id}", post(update_status))
}
