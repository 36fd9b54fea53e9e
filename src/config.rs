//! Server configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `AppConfig::from_env` reads the process environment once at startup.
//! Parsing goes through `from_lookup` so tests can feed a plain map instead
//! of mutating process-wide env vars.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_PG_ADMIN_DB: &str = "postgres";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_PRESIGN_EXPIRES_SECONDS: u64 = 600;
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 52_428_800;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
    #[error("unknown STORAGE_MODE: {0} (expected 'local' or 'aws')")]
    UnknownStorageMode(String),
}

/// Which storage backend serves file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Local,
    Aws,
}

impl StorageMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Aws => "aws",
        }
    }
}

/// S3 bucket settings, present only in `aws` mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
}

/// Limits applied when presigning uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Accepted `fileType` values. Empty means every type is accepted.
    pub allowed_file_types: BTreeSet<String>,
    pub max_file_size_bytes: u64,
    pub presign_expires_seconds: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_file_types: BTreeSet::new(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            presign_expires_seconds: DEFAULT_PRESIGN_EXPIRES_SECONDS,
        }
    }
}

impl UploadPolicy {
    #[must_use]
    pub fn allows_type(&self, file_type: &str) -> bool {
        self.allowed_file_types.is_empty() || self.allowed_file_types.contains(file_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Maintenance database used to create `database_name` when it is missing.
    pub admin_database_url: Option<String>,
    pub database_name: Option<String>,
    pub db_max_connections: u32,
    pub storage_mode: StorageMode,
    pub uploads_dir: PathBuf,
    pub s3: Option<S3Config>,
    pub upload_policy: UploadPolicy,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;

        let (database_url, admin_database_url, database_name) = match lookup("DATABASE_URL") {
            Some(url) if !url.is_empty() => (url, None, None),
            _ => {
                let host = required("PGHOST", lookup("PGHOST"))?;
                let pg_port = parse_or("PGPORT", lookup("PGPORT"), DEFAULT_PG_PORT)?;
                let user = required("PGUSER", lookup("PGUSER"))?;
                let password = required("PGPASSWORD", lookup("PGPASSWORD"))?;
                let database = required("PGDATABASE", lookup("PGDATABASE"))?;
                let admin_db = lookup("PGADMIN_DB").unwrap_or_else(|| DEFAULT_PG_ADMIN_DB.to_owned());
                let base = format!("postgres://{user}:{password}@{host}:{pg_port}");
                (format!("{base}/{database}"), Some(format!("{base}/{admin_db}")), Some(database))
            }
        };

        let db_max_connections =
            parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?;
        let storage_mode = parse_storage_mode(lookup("STORAGE_MODE").as_deref())?;
        let uploads_dir = lookup("UPLOADS_DIR").map_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR), PathBuf::from);

        let s3 = match storage_mode {
            StorageMode::Local => None,
            StorageMode::Aws => Some(S3Config {
                region: required("AWS_REGION", lookup("AWS_REGION"))?,
                bucket: required("FILES_BUCKET_NAME", lookup("FILES_BUCKET_NAME"))?,
            }),
        };

        let upload_policy = UploadPolicy {
            allowed_file_types: parse_type_list(lookup("ALLOWED_FILE_TYPES").as_deref()),
            max_file_size_bytes: parse_or(
                "MAX_FILE_SIZE_BYTES",
                lookup("MAX_FILE_SIZE_BYTES"),
                DEFAULT_MAX_FILE_SIZE_BYTES,
            )?,
            presign_expires_seconds: parse_or(
                "PRESIGN_EXPIRES_SECONDS",
                lookup("PRESIGN_EXPIRES_SECONDS"),
                DEFAULT_PRESIGN_EXPIRES_SECONDS,
            )?,
        };

        Ok(Self {
            port,
            database_url,
            admin_database_url,
            database_name,
            db_max_connections,
            storage_mode,
            uploads_dir,
            s3,
            upload_policy,
        })
    }
}

fn required(var: &'static str, raw: Option<String>) -> Result<String, ConfigError> {
    match raw {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value: v }),
    }
}

pub(crate) fn parse_storage_mode(raw: Option<&str>) -> Result<StorageMode, ConfigError> {
    match raw.unwrap_or("local") {
        "local" => Ok(StorageMode::Local),
        "aws" => Ok(StorageMode::Aws),
        other => Err(ConfigError::UnknownStorageMode(other.to_owned())),
    }
}

/// Split a comma-separated list, trimming entries and dropping empties.
pub(crate) fn parse_type_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
