//! Project routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::routes::error::ApiError;
use crate::services::catalog::ProjectRow;
use crate::services::project;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectBody {
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /projects`: create a project.
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectBody>, JsonRejection>,
) -> Result<Json<ProjectRow>, ApiError> {
    let Json(body) = body?;
    let row = project::create_project(&state, body.name.as_deref().unwrap_or_default()).await?;
    Ok(Json(row))
}
