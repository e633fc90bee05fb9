//! Sketch persistence: a saved annotation set plus its technical task stub.
//!
//! DESIGN
//! ======
//! Saving a sketch writes two files into the project's `sketches` folder,
//! `sketch_<millis>.json` (camera state and annotations) and, when the viewer
//! sent one, `sketch_<millis>.svg`. It then inserts a `sketches` row and a
//! `technical_tasks` row pointing at it, in one transaction.
//!
//! ERROR HANDLING
//! ==============
//! Files are written before the rows. If the transaction fails the files stay
//! on disk as orphans and the caller gets an error; the viewer keeps its
//! annotations, so the user can retry.

#[cfg(test)]
#[path = "sketch_test.rs"]
mod sketch_test;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;
use viewer::annotation::Annotation;
use viewer::camera::CameraHandle;

use crate::services::project::{self, ProjectError};
use crate::services::storage::{SKETCHES_DIR, StorageError};

/// Body of a sketch save, as produced by the viewer's sketch export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchPayload {
    #[serde(default)]
    pub camera_state: Option<CameraHandle>,
    #[serde(default)]
    pub canvas_data: Vec<Annotation>,
    #[serde(default)]
    pub svg_content: Option<String>,
}

/// Contents of `sketch_<millis>.json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SketchDocument<'a> {
    camera_state: &'a Option<CameraHandle>,
    canvas_data: &'a [Annotation],
}

/// Suffixed names tried before giving up on a stem.
const MAX_STEM_ATTEMPTS: u32 = 100;

/// Files written for one sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchFiles {
    pub stem: String,
    pub json_path: PathBuf,
    pub svg_path: Option<PathBuf>,
}

/// `sketch_<millis>` for the current wall-clock time.
#[must_use]
pub fn sketch_stem_now() -> String {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("sketch_{millis}")
}

/// Write the JSON (and SVG, if any) files for `payload` under
/// `<project_root>/sketches`, creating the folder if needed. Existing sketch
/// files are never overwritten: a taken `stem` gets a numeric suffix, and the
/// stem actually used is returned.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the folder or a file cannot be written.
pub async fn write_sketch_files(
    project_root: &Path,
    stem: &str,
    payload: &SketchPayload,
) -> Result<SketchFiles, StorageError> {
    let dir = project_root.join(SKETCHES_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| StorageError::Io { path: dir.clone(), source })?;

    let document = SketchDocument { camera_state: &payload.camera_state, canvas_data: &payload.canvas_data };
    let bytes = serde_json::to_vec_pretty(&document).map_err(|e| StorageError::Io {
        path: dir.join(format!("{stem}.json")),
        source: std::io::Error::other(e),
    })?;
    let (stem, mut file) = reserve_stem(&dir, stem).await?;
    let json_path = dir.join(format!("{stem}.json"));
    file.write_all(&bytes)
        .await
        .map_err(|source| StorageError::Io { path: json_path.clone(), source })?;
    file.flush()
        .await
        .map_err(|source| StorageError::Io { path: json_path.clone(), source })?;

    let svg_path = match payload.svg_content.as_deref().filter(|svg| !svg.is_empty()) {
        Some(svg) => {
            let path = dir.join(format!("{stem}.svg"));
            tokio::fs::write(&path, svg)
                .await
                .map_err(|source| StorageError::Io { path: path.clone(), source })?;
            Some(path)
        }
        None => None,
    };

    Ok(SketchFiles { stem, json_path, svg_path })
}

/// Claim `<stem>.json` in `dir`, or `<stem>_1.json`, `<stem>_2.json`, ... when
/// an earlier save in the same millisecond already holds the name.
async fn reserve_stem(dir: &Path, stem: &str) -> Result<(String, tokio::fs::File), StorageError> {
    for attempt in 0..MAX_STEM_ATTEMPTS {
        let candidate = if attempt == 0 { stem.to_string() } else { format!("{stem}_{attempt}") };
        let path = dir.join(format!("{candidate}.json"));
        match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(source) => return Err(StorageError::Io { path, source }),
        }
    }
    Err(StorageError::Io {
        path: dir.join(format!("{stem}.json")),
        source: std::io::Error::from(std::io::ErrorKind::AlreadyExists),
    })
}

/// Save a sketch for `project_id` and open a technical task for it.
/// Returns the new sketch id.
///
/// # Errors
///
/// Returns [`ProjectError::NotFound`] for an unknown project, or a storage or
/// database error.
pub async fn save_sketch(pool: &PgPool, project_id: Uuid, payload: &SketchPayload) -> Result<Uuid, ProjectError> {
    let row = project::get_project(pool, project_id).await?;
    let files = write_sketch_files(&row.root(), &sketch_stem_now(), payload).await?;

    let mut tx = pool.begin().await?;
    let sketch_id: Uuid = sqlx::query_scalar(
        "INSERT INTO sketches (project_id, camera_state, canvas_data, file_stem)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(project_id)
    .bind(Json(&payload.camera_state))
    .bind(Json(&payload.canvas_data))
    .bind(&files.stem)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO technical_tasks (project_id, sketch_id) VALUES ($1, $2)")
        .bind(project_id)
        .bind(sketch_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(%project_id, %sketch_id, annotations = payload.canvas_data.len(), stem = %files.stem, "sketch saved");
    Ok(sketch_id)
}
