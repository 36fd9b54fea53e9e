//! File routes — presigning, listing, and the local storage proxy.

use std::collections::BTreeMap;

use axum::body::{Body, Bytes};
use axum::extract::rejection::{BytesRejection, JsonRejection, QueryRejection};
use axum::extract::{Query, Request, State};
use axum::http::HeaderValue;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Json, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use uuid::Uuid;

use crate::routes::error::ApiError;
use crate::routes::extract::ApiPath;
use crate::services::catalog::FileRow;
use crate::services::files::{
    self, FileError, FileSpec, LocalUploadReceipt, PresignDownloadRequest, PresignDownloadResponse,
    PresignUploadResponse,
};
use crate::state::AppState;
use crate::storage::key::encode_uri_component;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Serialize, Deserialize)]
pub struct PresignUploadBody {
    pub files: Vec<FileSpec>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    #[serde(rename = "type")]
    pub file_type: Option<String>,
}

// =============================================================================
// VALIDATION
// =============================================================================

type FieldErrors = BTreeMap<String, Vec<String>>;

fn push_field(fields: &mut FieldErrors, path: String, message: &str) {
    fields.entry(path).or_default().push(message.into());
}

fn expect_string(fields: &mut FieldErrors, path: String, value: Option<&Value>, required: bool) {
    match value {
        None | Some(Value::Null) if required => push_field(fields, path, "required"),
        None | Some(Value::Null | Value::String(_)) => {}
        Some(_) => push_field(fields, path, "expected string"),
    }
}

/// Type-level problems in a presign-upload body, keyed by JSON path.
pub(crate) fn presign_upload_shape_errors(body: &Value) -> FieldErrors {
    let mut fields = FieldErrors::new();
    let Some(object) = body.as_object() else {
        push_field(&mut fields, "body".into(), "expected object");
        return fields;
    };
    let files = match object.get("files") {
        None | Some(Value::Null) => {
            push_field(&mut fields, "files".into(), "required");
            return fields;
        }
        Some(Value::Array(files)) => files,
        Some(_) => {
            push_field(&mut fields, "files".into(), "expected array");
            return fields;
        }
    };
    for (i, file) in files.iter().enumerate() {
        let Some(file) = file.as_object() else {
            push_field(&mut fields, format!("files.{i}"), "expected object");
            continue;
        };
        for name in ["originalName", "fileType", "mimeType"] {
            expect_string(&mut fields, format!("files.{i}.{name}"), file.get(name), true);
        }
        match file.get("sizeBytes") {
            None | Some(Value::Null) => push_field(&mut fields, format!("files.{i}.sizeBytes"), "required"),
            Some(size) if size.as_i64().is_some() => {}
            Some(_) => push_field(&mut fields, format!("files.{i}.sizeBytes"), "expected integer"),
        }
    }
    fields
}

/// Type-level problems in a presign-download body, keyed by JSON path.
pub(crate) fn presign_download_shape_errors(body: &Value) -> FieldErrors {
    let mut fields = FieldErrors::new();
    let Some(object) = body.as_object() else {
        push_field(&mut fields, "body".into(), "expected object");
        return fields;
    };
    expect_string(&mut fields, "type".into(), object.get("type"), false);
    match object.get("fileIds") {
        None | Some(Value::Null) => {}
        Some(Value::Array(ids)) => {
            for (i, id) in ids.iter().enumerate() {
                expect_string(&mut fields, format!("fileIds.{i}"), Some(id), true);
            }
        }
        Some(_) => push_field(&mut fields, "fileIds".into(), "expected array"),
    }
    fields
}

/// Check the shape of a raw JSON body, then deserialize it.
fn parse_body<T: DeserializeOwned>(body: Value, shape_errors: fn(&Value) -> FieldErrors) -> Result<T, ApiError> {
    let fields = shape_errors(&body);
    if !fields.is_empty() {
        return Err(ApiError::invalid_fields(fields));
    }
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Value checks on a well-typed body. Keys are JSON paths.
pub(crate) fn validate_presign_upload(body: &PresignUploadBody) -> Result<(), ApiError> {
    let mut fields = FieldErrors::new();
    if body.files.is_empty() {
        fields.entry("files".into()).or_default().push("must contain at least 1 file".into());
    }
    for (i, file) in body.files.iter().enumerate() {
        for (name, value) in [
            ("originalName", &file.original_name),
            ("fileType", &file.file_type),
            ("mimeType", &file.mime_type),
        ] {
            if value.is_empty() {
                fields.entry(format!("files.{i}.{name}")).or_default().push("must not be empty".into());
            }
        }
        if file.size_bytes <= 0 {
            fields.entry(format!("files.{i}.sizeBytes")).or_default().push("must be greater than 0".into());
        }
    }
    if fields.is_empty() { Ok(()) } else { Err(ApiError::invalid_fields(fields)) }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /projects/:id/files/presign-upload`: register files and hand out upload URLs.
pub async fn presign_upload(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Uuid>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PresignUploadResponse>, ApiError> {
    let Json(body) = body?;
    let body: PresignUploadBody = parse_body(body, presign_upload_shape_errors)?;
    validate_presign_upload(&body)?;
    let resp = files::presign_uploads(&state, project_id, &body.files).await?;
    Ok(Json(resp))
}

/// `GET /projects/:id/files?type=`: list file records, newest first.
pub async fn list_files(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Uuid>,
    query: Result<Query<ListFilesQuery>, QueryRejection>,
) -> Result<Json<Vec<FileRow>>, ApiError> {
    let Query(query) = query?;
    let rows = files::list_files(&state, project_id, query.file_type.as_deref()).await?;
    Ok(Json(rows))
}

/// `POST /projects/:id/files/presign-download`: download URLs by id list or type.
pub async fn presign_download(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Uuid>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PresignDownloadResponse>, ApiError> {
    let Json(body) = body?;
    let body: PresignDownloadRequest = parse_body(body, presign_download_shape_errors)?;
    let resp = files::presign_downloads(&state, project_id, &body).await?;
    Ok(Json(resp))
}

/// `PUT /projects/:id/files/:file_id/upload`: local mode byte upload.
pub async fn upload_local(
    State(state): State<AppState>,
    ApiPath((project_id, file_id)): ApiPath<(Uuid, Uuid)>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<LocalUploadReceipt>, ApiError> {
    // Mode is checked before the body so S3 deployments always get the same answer.
    if state.storage.as_local().is_none() {
        return Err(FileError::NotLocalMode.into());
    }
    let bytes = body?;
    let receipt = files::store_local_upload(&state, project_id, file_id, &bytes).await?;
    Ok(Json(receipt))
}

/// `GET /projects/:id/files/:file_id/download`: local mode byte download.
pub async fn download_local(
    State(state): State<AppState>,
    ApiPath((project_id, file_id)): ApiPath<(Uuid, Uuid)>,
    request: Request,
) -> Result<Response, ApiError> {
    let download = files::open_local_download(&state, project_id, file_id).await?;

    let response = match ServeFile::new(&download.path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);

    let content_type =
        HeaderValue::from_str(&download.mime_type).unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_MIME));
    let disposition = format!("attachment; filename=\"{}\"", encode_uri_component(&download.original_name));
    let disposition = HeaderValue::from_str(&disposition).map_err(|e| ApiError::internal(&e))?;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}

#[cfg(test)]
#[path = "files_test.rs"]
mod tests;
