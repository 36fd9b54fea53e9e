//! Storage backends — where file bytes live and how clients reach them.
//!
//! ARCHITECTURE
//! ============
//! The service layer allocates storage keys and asks a `StorageBackend` for
//! upload and download URLs. Two backends exist and one is chosen at startup
//! from `STORAGE_MODE`:
//!
//! | Backend | Mode | URLs |
//! |---------|------|------|
//! | [`local::LocalStorage`] | `local` | same-origin proxy endpoints on this server |
//! | [`s3::S3Storage`] | `aws` | `SigV4` presigned S3 URLs |
//!
//! Only the local backend can write or read bytes itself; handlers reach it
//! through [`StorageBackend::as_local`].

pub mod key;
pub mod local;
pub mod s3;

use std::sync::Arc;

use uuid::Uuid;

use crate::config::{AppConfig, StorageMode};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("aws storage mode requires AWS_REGION and FILES_BUCKET_NAME")]
    MissingS3Config,
    #[error("missing credential env var: {0}")]
    MissingCredentials(&'static str),
    #[error("request signing failed")]
    Signing,
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inputs for an upload URL.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub project_id: Uuid,
    pub file_id: Uuid,
    pub storage_key: &'a str,
    pub mime_type: &'a str,
}

/// Inputs for a download URL.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    pub project_id: Uuid,
    pub file_id: Uuid,
    pub storage_key: &'a str,
    pub original_name: &'a str,
}

pub trait StorageBackend: Send + Sync {
    fn mode(&self) -> StorageMode;

    /// URL the client should `PUT` the file bytes to.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be signed.
    fn upload_url(&self, req: &UploadRequest<'_>) -> Result<String, StorageError>;

    /// URL the client should `GET` the file bytes from.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be signed.
    fn download_url(&self, req: &DownloadRequest<'_>) -> Result<String, StorageError>;

    /// The local filesystem backend, if this is one.
    fn as_local(&self) -> Option<&local::LocalStorage> {
        None
    }
}

/// Build the backend selected by config.
///
/// # Errors
///
/// Returns an error if `aws` mode is selected without bucket config or credentials.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match (config.storage_mode, config.s3.as_ref()) {
        (StorageMode::Aws, Some(s3)) => {
            let credentials = s3::AwsCredentials::from_env()?;
            Ok(Arc::new(s3::S3Storage::new(
                s3.region.clone(),
                s3.bucket.clone(),
                credentials,
                config.upload_policy.presign_expires_seconds,
            )))
        }
        (StorageMode::Aws, None) => Err(StorageError::MissingS3Config),
        (StorageMode::Local, _) => Ok(Arc::new(local::LocalStorage::new(config.uploads_dir.clone()))),
    }
}
