//! File sharing handlers: upload, list, delete, download.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use validator::Validate;

use duoroom_core::error::AppError;
use duoroom_entity::FileDescriptor;
use duoroom_service::MemberContext;

use crate::dto::request::MemberQuery;
use crate::dto::response::{ApiResponse, FileDeletedResponse};
use crate::error::ApiError;
use crate::extractors::{parse_file_id, parse_room_id};
use crate::state::AppState;

/// POST /api/rooms/{room_id}/files (multipart: `name`, `file`)
pub async fn upload_file(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileDescriptor>>), ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let mut member: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_input(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid_input(format!("Read error: {e}")))?;
                member = Some(text.trim().to_string());
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::invalid_input(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let member = member
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::invalid_input("name is required"))?;
    let data = data.ok_or_else(|| AppError::invalid_input("file is required"))?;
    let file_name = file_name.ok_or_else(|| AppError::invalid_input("file name is required"))?;

    let ctx = MemberContext::new(room_id, member);
    let shared = state.registry.attach_file(&ctx, &file_name, data).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(shared.file))))
}

/// GET /api/rooms/{room_id}/files
pub async fn list_files(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<FileDescriptor>>>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let files = state.registry.files(&room_id).await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// DELETE /api/rooms/{room_id}/files/{file_id}?name=
///
/// Only the uploader may delete a file.
pub async fn delete_file(
    State(state): State<AppState>,
    Path((room_id, file_id)): Path<(String, String)>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<ApiResponse<FileDeletedResponse>>, ApiError> {
    query.validate()?;
    let room_id = parse_room_id(&room_id)?;
    let file_id = parse_file_id(&file_id)?;

    let ctx = MemberContext::new(room_id, query.name.trim());
    state.registry.delete_file(&ctx, file_id).await?;
    Ok(Json(ApiResponse::ok(FileDeletedResponse { file_id })))
}

/// GET /api/rooms/{room_id}/files/{file_id}/content
pub async fn download_file(
    State(state): State<AppState>,
    Path((room_id, file_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let file_id = parse_file_id(&file_id)?;
    let (file, data) = state.registry.file_content(&room_id, file_id).await?;

    let content_type = file
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let disposition = format!(
        "attachment; filename=\"{}\"",
        file.filename.replace(['"', '\\'], "_")
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
