//! Complaint endpoints for reporters.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, post},
};
use campussync_common::{
    AppError, AppResult, StorageBackend,
    storage::{file_extension, generate_storage_key},
};
use campussync_core::{CreateComplaintInput, UpdateComplaintInput};
use campussync_db::entities::{
    complaint::{Model as ComplaintModel, Priority, Status},
    complaint_history::Model as HistoryModel,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Complaint response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub priority: Priority,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    pub status: Status,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub date_posted: String,
}

impl From<ComplaintModel> for ComplaintResponse {
    fn from(c: ComplaintModel) -> Self {
        Self {
            id: c.id,
            title: c.title,
            category: c.category,
            description: c.description,
            priority: c.priority,
            location: c.location,
            image_file: c.image_file,
            status: c.status,
            user_id: c.user_id,
            assigned_to: c.assigned_to,
            date_posted: c.date_posted.to_rfc3339(),
        }
    }
}

/// History entry response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_status: Option<Status>,
    pub new_status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Absent for system-initiated changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    pub created_at: String,
}

impl From<HistoryModel> for HistoryResponse {
    fn from(h: HistoryModel) -> Self {
        Self {
            id: h.id,
            old_status: h.old_status,
            new_status: h.new_status,
            note: h.note,
            changed_by: h.changed_by,
            created_at: h.created_at.to_rfc3339(),
        }
    }
}

fn parse_priority(value: &str) -> AppResult<Priority> {
    match value.trim().to_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(AppError::BadRequest(format!("Unknown priority: {other}"))),
    }
}

/// File a new complaint via multipart form, optionally with an image.
async fn create_complaint(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let mut title: Option<String> = None;
    let mut category: Option<String> = None;
    let mut description: Option<String> = None;
    let mut priority: Option<Priority> = None;
    let mut location: Option<String> = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "title" => title = Some(read_text(field).await?),
            "category" => category = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "priority" => priority = Some(parse_priority(&read_text(field).await?)?),
            "location" => location = Some(read_text(field).await?),
            "image" => {
                let filename = field
                    .file_name()
                    .map(ToString::to_string)
                    .ok_or_else(|| AppError::BadRequest("Image field has no filename".to_string()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                // An empty file input is treated as no upload
                if !data.is_empty() {
                    image = Some((filename, data));
                }
            }
            _ => {}
        }
    }

    let image_file = match image {
        Some((filename, data)) => Some(store_image(&state, &filename, &data).await?),
        None => None,
    };

    let input = CreateComplaintInput {
        title: title.ok_or_else(|| AppError::BadRequest("Missing field: title".to_string()))?,
        category: category
            .ok_or_else(|| AppError::BadRequest("Missing field: category".to_string()))?,
        description: description
            .ok_or_else(|| AppError::BadRequest("Missing field: description".to_string()))?,
        priority: priority
            .ok_or_else(|| AppError::BadRequest("Missing field: priority".to_string()))?,
        location: location
            .ok_or_else(|| AppError::BadRequest("Missing field: location".to_string()))?,
        image_file,
    };

    let complaint = state.complaint_service.create(&user, input).await?;
    Ok(ApiResponse::ok(complaint.into()))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Validate the extension and persist an uploaded image. Returns the
/// stored filename.
async fn store_image(state: &AppState, filename: &str, data: &[u8]) -> AppResult<String> {
    let extension = file_extension(filename)
        .ok_or_else(|| AppError::BadRequest("Image filename has no extension".to_string()))?;

    if !state.upload.allowed_extensions.contains(&extension) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image type: .{extension}"
        )));
    }

    let key = generate_storage_key(&extension);
    let stored = state.storage.store(&key, data).await?;
    Ok(stored.key)
}

/// List the caller's own complaints.
async fn list_complaints(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ComplaintResponse>>> {
    let complaints = state.complaint_service.list_own(&user).await?;
    Ok(ApiResponse::ok(
        complaints.into_iter().map(Into::into).collect(),
    ))
}

/// Fetch a single complaint.
async fn get_complaint(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state.complaint_service.get(&user, &id).await?;
    Ok(ApiResponse::ok(complaint.into()))
}

/// Edit request for a pending complaint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditComplaintRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub location: Option<String>,
    pub image_file: Option<String>,
}

/// Edit a pending complaint's content fields. Author only.
async fn edit_complaint(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EditComplaintRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let input = UpdateComplaintInput {
        title: req.title,
        category: req.category,
        description: req.description,
        priority: req.priority,
        location: req.location,
        image_file: req.image_file,
    };

    let complaint = state.complaint_service.edit(&user, &id, input).await?;
    Ok(ApiResponse::ok(complaint.into()))
}

/// Audit trail for a complaint.
async fn complaint_history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<HistoryResponse>>> {
    let entries = state.complaint_service.history(&user, &id).await?;
    Ok(ApiResponse::ok(
        entries.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_complaint).get(list_complaints))
        .route("/{id}", get(get_complaint).put(edit_complaint))
        .route("/{id}/history", get(complaint_history))
}
