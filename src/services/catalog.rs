//! Catalog — project and file metadata persistence.
//!
//! DESIGN
//! ======
//! Route handlers and services never touch SQL directly; they go through the
//! `Catalog` trait. `PgCatalog` is the production implementation over the
//! shared `PgPool`. Tests swap in the in-memory catalog from
//! `state::test_helpers`, the same way AI tests swap in a mock LLM.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ROWS
// =============================================================================

/// A project. Mirrors the `projects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Upload lifecycle of a file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Uploaded,
    Failed,
}

impl FileStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "uploaded" => Some(Self::Uploaded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A file record. Mirrors the `files` table; serialized with the column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub original_name: String,
    pub file_type: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub status: FileStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub uploaded_at: Option<OffsetDateTime>,
}

/// Insert payload for a freshly presigned file.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub id: Uuid,
    pub project_id: Uuid,
    pub original_name: String,
    pub file_type: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn create_project(&self, name: &str) -> Result<ProjectRow, sqlx::Error>;

    async fn project_exists(&self, project_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Insert a file record in `pending` state.
    async fn insert_pending_file(&self, file: &NewFile) -> Result<FileRow, sqlx::Error>;

    /// Files of a project, newest first, optionally filtered by `file_type`.
    async fn list_files(&self, project_id: Uuid, file_type: Option<&str>) -> Result<Vec<FileRow>, sqlx::Error>;

    /// Files of a project whose id is in `ids`, newest first. Unknown ids are skipped.
    async fn files_by_ids(&self, project_id: Uuid, ids: &[Uuid]) -> Result<Vec<FileRow>, sqlx::Error>;

    async fn find_file(&self, project_id: Uuid, file_id: Uuid) -> Result<Option<FileRow>, sqlx::Error>;

    /// Set `status = 'uploaded'` and `uploaded_at = now()`. Returns the updated row.
    async fn mark_uploaded(&self, project_id: Uuid, file_id: Uuid) -> Result<Option<FileRow>, sqlx::Error>;
}

// =============================================================================
// POSTGRES
// =============================================================================

const FILE_COLUMNS: &str = "id, project_id, original_name, file_type, mime_type, size_bytes, storage_key, status, \
                            created_at, uploaded_at";

type FileTuple = (Uuid, Uuid, String, String, String, i64, String, String, OffsetDateTime, Option<OffsetDateTime>);

fn file_from_tuple(row: FileTuple) -> Result<FileRow, sqlx::Error> {
    let (id, project_id, original_name, file_type, mime_type, size_bytes, storage_key, status, created_at, uploaded_at) =
        row;
    let status = FileStatus::parse(&status)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown file status: {status}").into()))?;
    Ok(FileRow {
        id,
        project_id,
        original_name,
        file_type,
        mime_type,
        size_bytes,
        storage_key,
        status,
        created_at,
        uploaded_at,
    })
}

fn files_from_tuples(rows: Vec<FileTuple>) -> Result<Vec<FileRow>, sqlx::Error> {
    rows.into_iter().map(file_from_tuple).collect()
}

/// Production catalog backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn create_project(&self, name: &str) -> Result<ProjectRow, sqlx::Error> {
        let (id, name, created_at) = sqlx::query_as::<_, (Uuid, String, OffsetDateTime)>(
            "INSERT INTO projects (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(ProjectRow { id, name, created_at })
    }

    async fn project_exists(&self, project_id: Uuid) -> Result<bool, sqlx::Error> {
        let row = sqlx::query_scalar::<_, Uuid>("SELECT id FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_pending_file(&self, file: &NewFile) -> Result<FileRow, sqlx::Error> {
        let sql = format!(
            "INSERT INTO files (id, project_id, original_name, file_type, mime_type, size_bytes, storage_key, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {FILE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, FileTuple>(&sql)
            .bind(file.id)
            .bind(file.project_id)
            .bind(&file.original_name)
            .bind(&file.file_type)
            .bind(&file.mime_type)
            .bind(file.size_bytes)
            .bind(&file.storage_key)
            .bind(FileStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await?;
        file_from_tuple(row)
    }

    async fn list_files(&self, project_id: Uuid, file_type: Option<&str>) -> Result<Vec<FileRow>, sqlx::Error> {
        let rows = match file_type {
            Some(file_type) => {
                let sql = format!(
                    "SELECT {FILE_COLUMNS} FROM files WHERE project_id = $1 AND file_type = $2 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, FileTuple>(&sql)
                    .bind(project_id)
                    .bind(file_type)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE project_id = $1 ORDER BY created_at DESC");
                sqlx::query_as::<_, FileTuple>(&sql)
                    .bind(project_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        files_from_tuples(rows)
    }

    async fn files_by_ids(&self, project_id: Uuid, ids: &[Uuid]) -> Result<Vec<FileRow>, sqlx::Error> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE project_id = $1 AND id = ANY($2) ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, FileTuple>(&sql)
            .bind(project_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        files_from_tuples(rows)
    }

    async fn find_file(&self, project_id: Uuid, file_id: Uuid) -> Result<Option<FileRow>, sqlx::Error> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE project_id = $1 AND id = $2");
        let row = sqlx::query_as::<_, FileTuple>(&sql)
            .bind(project_id)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(file_from_tuple).transpose()
    }

    async fn mark_uploaded(&self, project_id: Uuid, file_id: Uuid) -> Result<Option<FileRow>, sqlx::Error> {
        let sql = format!(
            "UPDATE files SET status = $3, uploaded_at = now() \
             WHERE project_id = $1 AND id = $2 RETURNING {FILE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, FileTuple>(&sql)
            .bind(project_id)
            .bind(file_id)
            .bind(FileStatus::Uploaded.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(file_from_tuple).transpose()
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
