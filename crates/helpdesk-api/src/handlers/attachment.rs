//! Attachment handlers: multipart upload, listing, download and delete.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use helpdesk_core::error::AppError;
use helpdesk_entity::attachment::Attachment;
use helpdesk_service::IncomingFile;

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath};
use crate::state::AppState;

/// Multipart field carrying the uploaded files.
pub const FILES_FIELD: &str = "files";

/// POST /api/tickets/{id}/files
pub async fn upload_files(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(ticket_id): IdPath,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<Attachment>>>)> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::validation("Every uploaded file needs a file name"))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
        files.push(IncomingFile::new(file_name, content_type, data));
    }

    let stored = state
        .attachment_service
        .upload(&auth, ticket_id, files)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(stored))))
}

/// GET /api/tickets/{id}/files
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(ticket_id): IdPath,
) -> ApiResult<Json<ApiResponse<Vec<Attachment>>>> {
    let files = state.attachment_service.list(&auth, ticket_id).await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(file_id): IdPath,
) -> ApiResult<Response> {
    let (attachment, stream) = state.attachment_service.download(&auth, file_id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&attachment.file_name),
        )
        .header(header::CONTENT_LENGTH, attachment.size_bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(file_id): IdPath,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.attachment_service.delete(&auth, file_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("File deleted"))))
}

/// `attachment` disposition carrying the original name in RFC 5987 form.
pub fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        utf8_percent_encode(file_name, NON_ALPHANUMERIC)
    )
}
