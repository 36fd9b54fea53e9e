//! Local filesystem backend.
//!
//! Bytes live under `<root>/<storage_key>`. Clients upload and download
//! through this server's `/projects/:id/files/:file_id/{upload,download}`
//! endpoints instead of a presigned third-party URL.

use std::path::{Component, Path, PathBuf};

use super::{DownloadRequest, StorageBackend, StorageError, UploadRequest};
use crate::config::StorageMode;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Resolve a storage key to a path under the root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for empty keys and keys that are absolute or
    /// contain `.`/`..` segments.
    pub fn path_for(&self, storage_key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(storage_key);
        if storage_key.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(StorageError::InvalidKey(storage_key.to_owned()));
        }
        Ok(self.root.join(relative))
    }

    /// Write `bytes` at the key's path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid keys or filesystem failures.
    pub async fn write(&self, storage_key: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.path_for(storage_key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Path of the stored bytes, or `None` if nothing was uploaded for the key.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid keys or filesystem failures other than not-found.
    pub async fn resolve(&self, storage_key: &str) -> Result<Option<PathBuf>, StorageError> {
        let path = self.path_for(storage_key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

impl StorageBackend for LocalStorage {
    fn mode(&self) -> StorageMode {
        StorageMode::Local
    }

    fn upload_url(&self, req: &UploadRequest<'_>) -> Result<String, StorageError> {
        Ok(format!("/projects/{}/files/{}/upload", req.project_id, req.file_id))
    }

    fn download_url(&self, req: &DownloadRequest<'_>) -> Result<String, StorageError> {
        Ok(format!("/projects/{}/files/{}/download", req.project_id, req.file_id))
    }

    fn as_local(&self) -> Option<&LocalStorage> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn path_for_rejects_escaping_keys() {
        let storage = LocalStorage::new("/srv/uploads");
        assert!(storage.path_for("projects/a/pdf/b__c.pdf").is_ok());
        assert!(matches!(storage.path_for(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.path_for("/etc/passwd"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.path_for("projects/../../etc"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.path_for("./projects/x"), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn urls_point_at_proxy_endpoints() {
        let storage = LocalStorage::new("uploads");
        let project_id = Uuid::from_u128(7);
        let file_id = Uuid::from_u128(9);
        let up = storage
            .upload_url(&UploadRequest { project_id, file_id, storage_key: "k", mime_type: "application/pdf" })
            .unwrap();
        assert_eq!(up, format!("/projects/{project_id}/files/{file_id}/upload"));
        let down = storage
            .download_url(&DownloadRequest { project_id, file_id, storage_key: "k", original_name: "a.pdf" })
            .unwrap();
        assert_eq!(down, format!("/projects/{project_id}/files/{file_id}/download"));
        assert_eq!(storage.mode(), StorageMode::Local);
        assert!(storage.as_local().is_some());
    }

    #[tokio::test]
    async fn write_then_resolve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let key = "projects/p/pdf/f__plan.pdf";

        assert!(storage.resolve(key).await.unwrap().is_none());

        let written = storage.write(key, b"%PDF-1.7").await.unwrap();
        assert_eq!(written, dir.path().join(key));

        let resolved = storage.resolve(key).await.unwrap().expect("file should exist");
        assert_eq!(tokio::fs::read(resolved).await.unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn resolve_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.write("projects/p/pdf/f__x", b"1").await.unwrap();
        assert!(storage.resolve("projects/p/pdf").await.unwrap().is_none());
    }
}
