//! Project scene load and save.
//!
//! DESIGN
//! ======
//! A project's scene is assembled per request from two sources: the mesh
//! files currently in its `stl` folder (authoritative for which models exist)
//! and the `scene_state` column (per-model display settings). The merge
//! itself happens in the viewer; this service only delivers both halves and
//! overwrites `scene_state` when an administrator saves.
//!
//! ERROR HANDLING
//! ==============
//! A stored `scene_state` that cannot be decoded is logged and served as
//! `null`, so the viewer falls back to defaults instead of refusing to open
//! the project. Saving never merges: the submitted array replaces the column.

#[cfg(test)]
#[path = "project_test.rs"]
mod project_test;

use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, warn};
use uuid::Uuid;
use viewer::scene::{self, MeshFile, ModelConfig, SceneError};

use crate::config::Config;
use crate::services::storage::{self, StorageError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Row from the `projects` table.
#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub patient_name: String,
    pub doctor_display_name: Option<String>,
    pub file_path_root: String,
    pub scene_state: Option<serde_json::Value>,
}

impl ProjectRow {
    #[must_use]
    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.file_path_root)
    }
}

/// Project summary sent to the viewer. The on-disk path stays server-side.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub patient_name: String,
    pub doctor_display_name: Option<String>,
}

impl From<&ProjectRow> for ProjectSummary {
    fn from(row: &ProjectRow) -> Self {
        Self {
            id: row.id,
            doctor_id: row.doctor_id,
            patient_name: row.patient_name.clone(),
            doctor_display_name: row.doctor_display_name.clone(),
        }
    }
}

/// Everything the viewer needs to open a project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectScene {
    pub project: ProjectSummary,
    pub stl_files: Vec<MeshFile>,
    /// Saved per-model settings as an array, or `null` if never saved.
    pub scene_state: serde_json::Value,
}

// =============================================================================
// QUERIES
// =============================================================================

type ProjectTuple = (Uuid, Option<Uuid>, String, Option<String>, String, Option<serde_json::Value>);

/// Load one project row.
///
/// # Errors
///
/// Returns [`ProjectError::NotFound`] if no row matches, or a database error.
pub async fn get_project(pool: &PgPool, project_id: Uuid) -> Result<ProjectRow, ProjectError> {
    let row = sqlx::query_as::<_, ProjectTuple>(
        "SELECT id, doctor_id, patient_name, doctor_display_name, file_path_root, scene_state
         FROM projects
         WHERE id = $1",
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ProjectError::NotFound(project_id))?;

    let (id, doctor_id, patient_name, doctor_display_name, file_path_root, scene_state) = row;
    Ok(ProjectRow { id, doctor_id, patient_name, doctor_display_name, file_path_root, scene_state })
}

/// Overwrite a project's scene state with the full model array.
///
/// # Errors
///
/// Returns [`ProjectError::NotFound`] if no row matches, or a database error.
pub async fn save_scene_state(pool: &PgPool, project_id: Uuid, models: &[ModelConfig]) -> Result<(), ProjectError> {
    let result = sqlx::query("UPDATE projects SET scene_state = $1 WHERE id = $2")
        .bind(Json(models))
        .bind(project_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ProjectError::NotFound(project_id));
    }
    info!(%project_id, models = models.len(), "scene saved");
    Ok(())
}

/// Assemble the scene payload for a project.
///
/// # Errors
///
/// Returns [`ProjectError`] if the project is missing, the query fails, or
/// its `stl` folder cannot be read.
pub async fn load_scene(pool: &PgPool, config: &Config, project_id: Uuid) -> Result<ProjectScene, ProjectError> {
    let row = get_project(pool, project_id).await?;
    scene_for_row(&row, &config.storage_dir, &config.public_base_url).await
}

/// Build the scene payload for an already loaded row.
///
/// # Errors
///
/// Returns [`ProjectError::Storage`] if the `stl` folder cannot be read.
pub async fn scene_for_row(
    row: &ProjectRow,
    storage_root: &Path,
    public_base_url: &str,
) -> Result<ProjectScene, ProjectError> {
    let root = row.root();
    let names = storage::list_stl_files(&root).await?;
    let stl_files = storage::mesh_files(&names, public_base_url, &storage::public_path(storage_root, &root));

    let raw = row.scene_state.clone().unwrap_or(serde_json::Value::Null);
    let scene_state = normalize_scene_state(&raw).unwrap_or_else(|e| {
        warn!(project_id = %row.id, error = %e, "stored scene state unreadable; serving defaults");
        serde_json::Value::Null
    });

    Ok(ProjectScene { project: ProjectSummary::from(row), stl_files, scene_state })
}

/// Decode whatever is stored (array, JSON text of an array, or null) and
/// re-encode it as a plain array, or `null` when nothing was saved.
///
/// # Errors
///
/// Returns [`SceneError`] if the stored value has neither shape.
pub fn normalize_scene_state(raw: &serde_json::Value) -> Result<serde_json::Value, SceneError> {
    if raw.is_null() {
        return Ok(serde_json::Value::Null);
    }
    let entries = scene::parse_saved_state(raw)?;
    Ok(serde_json::to_value(entries)?)
}
