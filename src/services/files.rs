//! File service — upload/download presigning and the local storage proxy.
//!
//! DESIGN
//! ======
//! Presigning an upload allocates a storage key, records the file as
//! `pending`, and hands back a URL from the active storage backend. The whole
//! batch is validated before the first key is allocated, so a rejected
//! request leaves no rows behind.
//!
//! In local mode the bytes come back through `store_local_upload`, which is
//! the only path that moves a record to `uploaded`. S3 uploads go straight
//! to the bucket and their records stay `pending`.
//!
//! ERROR HANDLING
//! ==============
//! Domain failures carry their HTTP meaning in `FileError`; the route layer
//! maps variants to status codes and surfaces the display text verbatim.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{StorageMode, UploadPolicy};
use crate::services::catalog::{FileRow, NewFile};
use crate::state::AppState;
use crate::storage::key::storage_key;
use crate::storage::{DownloadRequest, StorageError, UploadRequest};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Project not found")]
    ProjectNotFound(Uuid),
    #[error("File type {0} not allowed")]
    FileTypeNotAllowed(String),
    #[error("Invalid file type {0}")]
    FileTypeInvalid(String),
    #[error("File too large")]
    FileTooLarge { size_bytes: i64, max_bytes: u64 },
    #[error("Provide either type or fileIds")]
    MissingFilter,
    #[error("No files found")]
    NoFilesFound,
    #[error("File not found")]
    FileNotFound(Uuid),
    #[error("File not uploaded yet")]
    NotUploaded(Uuid),
    #[error("Not in local storage mode")]
    NotLocalMode,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One file the client intends to upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    pub original_name: String,
    pub file_type: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignUploadItem {
    pub file_id: Uuid,
    pub storage_key: String,
    pub upload_url: String,
    pub mode: StorageMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignUploadResponse {
    pub expires_in_seconds: u64,
    pub items: Vec<PresignUploadItem>,
}

/// Download selection. Non-empty `file_ids` wins over `file_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignDownloadRequest {
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub file_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignDownloadItem {
    pub file_id: Uuid,
    pub original_name: String,
    pub file_type: String,
    pub download_url: String,
    pub mode: StorageMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignDownloadResponse {
    pub expires_in_seconds: u64,
    pub items: Vec<PresignDownloadItem>,
}

/// Result of a local-mode byte upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUploadReceipt {
    pub ok: bool,
    pub stored_as: String,
    pub size_bytes: u64,
}

/// A local-mode file ready to be streamed back.
#[derive(Debug, Clone)]
pub struct LocalDownload {
    pub path: PathBuf,
    pub mime_type: String,
    pub original_name: String,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Check one file against the upload policy.
///
/// # Errors
///
/// Returns `FileTypeNotAllowed`, `FileTypeInvalid` or `FileTooLarge`.
pub fn validate_file(policy: &UploadPolicy, file: &FileSpec) -> Result<(), FileError> {
    if !policy.allows_type(&file.file_type) {
        return Err(FileError::FileTypeNotAllowed(file.file_type.clone()));
    }
    // The type becomes a storage key segment.
    if matches!(file.file_type.as_str(), "." | "..") || file.file_type.contains(['/', '\\']) {
        return Err(FileError::FileTypeInvalid(file.file_type.clone()));
    }
    let too_large = u64::try_from(file.size_bytes).map_or(false, |size| size > policy.max_file_size_bytes);
    if too_large {
        return Err(FileError::FileTooLarge { size_bytes: file.size_bytes, max_bytes: policy.max_file_size_bytes });
    }
    Ok(())
}

// =============================================================================
// PRESIGN
// =============================================================================

/// Validate, allocate storage keys, record `pending` rows, and return upload URLs.
///
/// # Errors
///
/// Returns `ProjectNotFound`, a validation error, or a storage/database error.
pub async fn presign_uploads(
    state: &AppState,
    project_id: Uuid,
    files: &[FileSpec],
) -> Result<PresignUploadResponse, FileError> {
    if !state.catalog.project_exists(project_id).await? {
        return Err(FileError::ProjectNotFound(project_id));
    }

    for file in files {
        validate_file(&state.upload_policy, file)?;
    }

    let mode = state.storage.mode();
    let mut items = Vec::with_capacity(files.len());
    for file in files {
        let file_id = Uuid::new_v4();
        let key = storage_key(project_id, &file.file_type, file_id, &file.original_name);
        let upload_url = state.storage.upload_url(&UploadRequest {
            project_id,
            file_id,
            storage_key: &key,
            mime_type: &file.mime_type,
        })?;

        state
            .catalog
            .insert_pending_file(&NewFile {
                id: file_id,
                project_id,
                original_name: file.original_name.clone(),
                file_type: file.file_type.clone(),
                mime_type: file.mime_type.clone(),
                size_bytes: file.size_bytes,
                storage_key: key.clone(),
            })
            .await?;

        items.push(PresignUploadItem { file_id, storage_key: key, upload_url, mode });
    }

    info!(%project_id, count = items.len(), mode = mode.as_str(), "presigned uploads");
    Ok(PresignUploadResponse { expires_in_seconds: state.upload_policy.presign_expires_seconds, items })
}

/// List a project's files, newest first. An empty `file_type` means no filter.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_files(state: &AppState, project_id: Uuid, file_type: Option<&str>) -> Result<Vec<FileRow>, FileError> {
    let file_type = file_type.filter(|t| !t.is_empty());
    Ok(state.catalog.list_files(project_id, file_type).await?)
}

/// Resolve files by id list or type and return one download URL per file.
///
/// # Errors
///
/// Returns `MissingFilter` when neither selector is given, `NoFilesFound` when
/// nothing matches, or a storage/database error.
pub async fn presign_downloads(
    state: &AppState,
    project_id: Uuid,
    req: &PresignDownloadRequest,
) -> Result<PresignDownloadResponse, FileError> {
    let rows = match (req.file_ids.as_deref(), req.file_type.as_deref()) {
        (Some(ids), _) if !ids.is_empty() => {
            // Ids that are not UUIDs cannot match any row.
            let parsed: Vec<Uuid> = ids.iter().filter_map(|id| Uuid::parse_str(id).ok()).collect();
            if parsed.is_empty() {
                Vec::new()
            } else {
                state.catalog.files_by_ids(project_id, &parsed).await?
            }
        }
        (_, Some(file_type)) if !file_type.is_empty() => state.catalog.list_files(project_id, Some(file_type)).await?,
        _ => return Err(FileError::MissingFilter),
    };

    if rows.is_empty() {
        return Err(FileError::NoFilesFound);
    }

    let mode = state.storage.mode();
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let download_url = state.storage.download_url(&DownloadRequest {
            project_id,
            file_id: row.id,
            storage_key: &row.storage_key,
            original_name: &row.original_name,
        })?;
        items.push(PresignDownloadItem {
            file_id: row.id,
            original_name: row.original_name,
            file_type: row.file_type,
            download_url,
            mode,
        });
    }

    info!(%project_id, count = items.len(), mode = mode.as_str(), "presigned downloads");
    Ok(PresignDownloadResponse { expires_in_seconds: state.upload_policy.presign_expires_seconds, items })
}

// =============================================================================
// LOCAL PROXY
// =============================================================================

/// Write uploaded bytes for a file and mark it `uploaded`.
///
/// # Errors
///
/// Returns `NotLocalMode`, `FileNotFound`, or a storage/database error.
pub async fn store_local_upload(
    state: &AppState,
    project_id: Uuid,
    file_id: Uuid,
    bytes: &[u8],
) -> Result<LocalUploadReceipt, FileError> {
    let local = state.storage.as_local().ok_or(FileError::NotLocalMode)?;

    let file = state
        .catalog
        .find_file(project_id, file_id)
        .await?
        .ok_or(FileError::FileNotFound(file_id))?;

    local.write(&file.storage_key, bytes).await?;

    if state.catalog.mark_uploaded(project_id, file_id).await?.is_none() {
        warn!(%project_id, %file_id, "file record vanished after bytes were written");
        return Err(FileError::FileNotFound(file_id));
    }

    let size_bytes = bytes.len() as u64;
    if i64::try_from(size_bytes).map_or(true, |written| written != file.size_bytes) {
        warn!(%file_id, declared = file.size_bytes, written = size_bytes, "upload size differs from declared size");
    }
    info!(%project_id, %file_id, size_bytes, "stored local upload");

    Ok(LocalUploadReceipt { ok: true, stored_as: file.storage_key, size_bytes })
}

/// Locate a file's bytes on disk for streaming.
///
/// # Errors
///
/// Returns `NotLocalMode`, `FileNotFound`, `NotUploaded`, or a storage/database error.
pub async fn open_local_download(state: &AppState, project_id: Uuid, file_id: Uuid) -> Result<LocalDownload, FileError> {
    let local = state.storage.as_local().ok_or(FileError::NotLocalMode)?;

    let file = state
        .catalog
        .find_file(project_id, file_id)
        .await?
        .ok_or(FileError::FileNotFound(file_id))?;

    let path = local
        .resolve(&file.storage_key)
        .await?
        .ok_or(FileError::NotUploaded(file_id))?;

    Ok(LocalDownload { path, mime_type: file.mime_type, original_name: file.original_name })
}

#[cfg(test)]
#[path = "files_test.rs"]
mod tests;
