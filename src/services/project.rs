//! Project service — project creation.

use tracing::info;

use crate::services::catalog::ProjectRow;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("name required")]
    NameRequired,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a new project.
///
/// # Errors
///
/// Returns `NameRequired` for a blank name, or a database error if the insert fails.
pub async fn create_project(state: &AppState, name: &str) -> Result<ProjectRow, ProjectError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProjectError::NameRequired);
    }

    let row = state.catalog.create_project(name).await?;
    info!(project_id = %row.id, name = %row.name, "project created");
    Ok(row)
}
