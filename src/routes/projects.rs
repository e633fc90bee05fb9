//! Project scene and sketch routes.

#[cfg(test)]
#[path = "projects_test.rs"]
mod projects_test;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use viewer::scene::ModelConfig;

use crate::services::project::{self, ProjectError, ProjectScene};
use crate::services::sketch::{self, SketchPayload};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSceneBody {
    pub scene_state: Vec<ModelConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSketchResponse {
    pub sketch_id: Uuid,
}

pub(crate) fn project_error_to_status(err: ProjectError) -> StatusCode {
    match err {
        ProjectError::NotFound(_) => StatusCode::NOT_FOUND,
        err @ (ProjectError::Database(_) | ProjectError::Storage(_) | ProjectError::Serialize(_)) => {
            tracing::error!(error = %err, "project request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /api/projects/{id}/scene`: mesh files and saved scene settings.
pub async fn get_scene(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectScene>, StatusCode> {
    let scene = project::load_scene(&state.pool, &state.config, project_id)
        .await
        .map_err(project_error_to_status)?;
    Ok(Json(scene))
}

/// `PUT /api/projects/{id}/scene`: overwrite the saved scene settings.
pub async fn save_scene(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<SaveSceneBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    project::save_scene_state(&state.pool, project_id, &body.scene_state)
        .await
        .map_err(project_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/projects/{id}/sketches`: store an annotation set and open a technical task.
pub async fn save_sketch(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<SketchPayload>,
) -> Result<(StatusCode, Json<SaveSketchResponse>), StatusCode> {
    let sketch_id = sketch::save_sketch(&state.pool, project_id, &body)
        .await
        .map_err(project_error_to_status)?;
    Ok((StatusCode::CREATED, Json(SaveSketchResponse { sketch_id })))
}
