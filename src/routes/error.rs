//! JSON error responses.
//!
//! Every failure leaves the server as `{"message": ...}` with an optional
//! `fieldErrors` map for request validation problems. Internal errors are
//! logged here and reach the client only as `Internal Server Error`.

use std::collections::BTreeMap;

use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

use crate::services::files::FileError;
use crate::services::project::ProjectError;
use crate::storage::StorageError;

pub const INTERNAL_MESSAGE: &str = "Internal Server Error";
pub const INVALID_BODY_MESSAGE: &str = "invalid request body";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub field_errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), field_errors: None }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 400 with per-field messages keyed by JSON path (`files.0.sizeBytes`).
    #[must_use]
    pub fn invalid_fields(field_errors: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: INVALID_BODY_MESSAGE.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Log `cause` and return an opaque 500.
    pub fn internal(cause: &dyn std::fmt::Display) -> Self {
        error!(error = %cause, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { message: self.message, field_errors: self.field_errors };
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// DOMAIN ERRORS
// =============================================================================

pub(crate) fn file_error_to_status(err: &FileError) -> StatusCode {
    match err {
        FileError::ProjectNotFound(_) | FileError::NoFilesFound | FileError::FileNotFound(_) | FileError::NotUploaded(_) => {
            StatusCode::NOT_FOUND
        }
        FileError::FileTypeNotAllowed(_)
        | FileError::FileTypeInvalid(_)
        | FileError::FileTooLarge { .. }
        | FileError::MissingFilter
        | FileError::NotLocalMode
        | FileError::Storage(StorageError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
        FileError::Storage(_) | FileError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn project_error_to_status(err: &ProjectError) -> StatusCode {
    match err {
        ProjectError::NameRequired => StatusCode::BAD_REQUEST,
        ProjectError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        let status = file_error_to_status(&err);
        if status.is_server_error() {
            return Self::internal(&err);
        }
        Self::new(status, err.to_string())
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        let status = project_error_to_status(&err);
        if status.is_server_error() {
            return Self::internal(&err);
        }
        Self::new(status, err.to_string())
    }
}

// =============================================================================
// EXTRACTOR REJECTIONS
// =============================================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, "File too large");
        }
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
