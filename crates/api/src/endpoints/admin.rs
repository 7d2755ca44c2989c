//! Admin endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use campussync_common::AppResult;
use campussync_db::entities::complaint::Status;
use serde::Deserialize;

use crate::{
    endpoints::complaints::ComplaintResponse,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Listing filter.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<Status>,
}

/// All complaints, optionally filtered by status.
async fn list_all(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ComplaintResponse>>> {
    let complaints = state.complaint_service.list_all(&user, query.status).await?;
    Ok(ApiResponse::ok(
        complaints.into_iter().map(Into::into).collect(),
    ))
}

/// Assignment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub staff_id: String,
}

/// Assign a complaint to a staff user.
async fn assign(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state
        .complaint_service
        .assign(&user, &id, &req.staff_id)
        .await?;
    Ok(ApiResponse::ok(complaint.into()))
}

/// Soft-delete a complaint.
async fn soft_delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.complaint_service.soft_delete(&user, &id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/complaints", get(list_all))
        .route("/complaints/{id}/assign", post(assign))
        .route("/complaints/{id}", delete(soft_delete))
}
