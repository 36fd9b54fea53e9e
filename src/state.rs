//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the metadata catalog, the active storage backend, and the upload
//! policy. Both the catalog and the backend sit behind trait objects so the
//! same handlers run against Postgres + S3 in production and against the
//! in-memory catalog + a temp directory in tests.

use std::sync::Arc;

use crate::config::UploadPolicy;
use crate::services::catalog::Catalog;
use crate::storage::StorageBackend;

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; every field is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub storage: Arc<dyn StorageBackend>,
    pub upload_policy: Arc<UploadPolicy>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, storage: Arc<dyn StorageBackend>, upload_policy: UploadPolicy) -> Self {
        Self { catalog, storage, upload_policy: Arc::new(upload_policy) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
