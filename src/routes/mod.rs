//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the JSON API for projects and files plus the two
//! local storage proxy endpoints. CORS is wide open because the viewer and
//! upload tooling run from arbitrary origins.

pub mod error;
pub mod extract;
pub mod files;
pub mod projects;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::Json;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The proxy buffers uploads in memory, so the body cap follows the file size limit.
    let upload_limit = usize::try_from(state.upload_policy.max_file_size_bytes).unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(health))
        .route("/projects", post(projects::create_project))
        .route("/projects/{id}/files", get(files::list_files))
        .route("/projects/{id}/files/presign-upload", post(files::presign_upload))
        .route("/projects/{id}/files/presign-download", post(files::presign_download))
        .route(
            "/projects/{id}/files/{file_id}/upload",
            put(files::upload_local).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/projects/{id}/files/{file_id}/download", get(files::download_local))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
