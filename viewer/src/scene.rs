//! Scene configuration: which meshes exist and how each one is displayed.
//!
//! DESIGN
//! ======
//! The mesh file list from storage decides which models exist. The persisted
//! scene state only supplies per-model settings, matched by `id`. [`merge`]
//! reconciles the two once per scene load; the result is held by [`Scene`],
//! which the administrator edits and snapshots for saving.
//!
//! ERROR HANDLING
//! ==============
//! A saved state that is not an array (or a string holding one) is rejected
//! as a whole with [`SceneError`]; the caller keeps whatever scene it had.
//! Individual entries without a usable `id` are skipped.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use glam::{DMat4, DQuat, DVec3, EulerRot};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MODEL_COLOR, DEFAULT_MODEL_OPACITY};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scene state must be an array, got {0}")]
    NotAnArray(&'static str),
}

/// A mesh file discovered in project storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshFile {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Display and placement settings for one mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub visible: bool,
    /// Material opacity in `[0, 1]`.
    pub opacity: f64,
    /// CSS hex color of the mesh material.
    pub color: String,
    /// World translation in millimetres.
    pub position: [f64; 3],
    /// XYZ Euler rotation in degrees.
    pub rotation: [f64; 3],
}

/// A persisted settings entry. Everything except `id` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialModelConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
}

/// Coordinate axis selector for per-axis edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() { DEFAULT_MODEL_OPACITY } else { opacity.clamp(0.0, 1.0) }
}

impl ModelConfig {
    /// Default settings for a freshly discovered file.
    #[must_use]
    pub fn with_defaults(file: &MeshFile) -> Self {
        Self {
            id: file.id.clone(),
            name: file.name.clone(),
            url: file.url.clone(),
            visible: true,
            opacity: DEFAULT_MODEL_OPACITY,
            color: DEFAULT_MODEL_COLOR.to_owned(),
            position: [0.0; 3],
            rotation: [0.0; 3],
        }
    }

    /// Overlay every field present in `saved`. Saved values win.
    pub fn apply(&mut self, saved: &PartialModelConfig) {
        if let Some(ref name) = saved.name {
            self.name.clone_from(name);
        }
        if let Some(ref url) = saved.url {
            self.url.clone_from(url);
        }
        if let Some(visible) = saved.visible {
            self.visible = visible;
        }
        if let Some(opacity) = saved.opacity {
            self.opacity = clamp_opacity(opacity);
        }
        if let Some(ref color) = saved.color {
            self.color.clone_from(color);
        }
        if let Some(position) = saved.position {
            self.position = position;
        }
        if let Some(rotation) = saved.rotation {
            self.rotation = rotation;
        }
    }

    /// Rotation converted to radians, in X, Y, Z order.
    #[must_use]
    pub fn rotation_radians(&self) -> [f64; 3] {
        self.rotation.map(f64::to_radians)
    }

    /// Model matrix: translation after XYZ Euler rotation.
    #[must_use]
    pub fn transform(&self) -> DMat4 {
        let [rx, ry, rz] = self.rotation_radians();
        let rotation = DQuat::from_euler(EulerRot::XYZ, rx, ry, rz);
        DMat4::from_rotation_translation(rotation, DVec3::from_array(self.position))
    }
}

/// Reconcile discovered files with persisted settings.
///
/// One entry per file, in file order. Saved entries whose `id` matches no
/// file are dropped.
#[must_use]
pub fn merge(files: &[MeshFile], saved: &[PartialModelConfig]) -> Vec<ModelConfig> {
    files
        .iter()
        .map(|file| {
            let mut model = ModelConfig::with_defaults(file);
            if let Some(entry) = saved.iter().find(|s| s.id == file.id) {
                model.apply(entry);
            }
            model
        })
        .collect()
}

/// Decode persisted scene state.
///
/// Accepts an array, a JSON string containing an array (older rows stored
/// the serialized text), or null for a scene that was never saved.
///
/// # Errors
///
/// Returns [`SceneError`] if the value is neither of those shapes.
pub fn parse_saved_state(value: &serde_json::Value) -> Result<Vec<PartialModelConfig>, SceneError> {
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::String(text) => {
            let inner: serde_json::Value = serde_json::from_str(text)?;
            match inner {
                serde_json::Value::String(_) => Err(SceneError::NotAnArray("nested string")),
                other => parse_saved_state(&other),
            }
        }
        serde_json::Value::Array(entries) => Ok(entries.iter().filter_map(parse_entry).collect()),
        serde_json::Value::Bool(_) => Err(SceneError::NotAnArray("boolean")),
        serde_json::Value::Number(_) => Err(SceneError::NotAnArray("number")),
        serde_json::Value::Object(_) => Err(SceneError::NotAnArray("object")),
    }
}

fn parse_entry(entry: &serde_json::Value) -> Option<PartialModelConfig> {
    match serde_json::from_value::<PartialModelConfig>(entry.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("skipping saved model entry: {e}");
            None
        }
    }
}

/// The live, admin-editable scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    models: Vec<ModelConfig>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the scene from a fresh file listing and saved settings.
    #[must_use]
    pub fn load(files: &[MeshFile], saved: &[PartialModelConfig]) -> Self {
        Self { models: merge(files, saved) }
    }

    /// Models in display order.
    #[must_use]
    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ModelConfig> {
        self.models.iter_mut().find(|m| m.id == id)
    }

    /// Show or hide a model. Returns false if `id` is unknown.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        let Some(model) = self.get_mut(id) else {
            return false;
        };
        model.visible = visible;
        true
    }

    /// Set opacity, clamped into `[0, 1]`. Returns false if `id` is unknown.
    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> bool {
        let Some(model) = self.get_mut(id) else {
            return false;
        };
        model.opacity = clamp_opacity(opacity);
        true
    }

    /// Set the material color. Returns false if `id` is unknown.
    pub fn set_color(&mut self, id: &str, color: &str) -> bool {
        let Some(model) = self.get_mut(id) else {
            return false;
        };
        color.clone_into(&mut model.color);
        true
    }

    /// Set one translation component. Non-finite input stores `0.0`.
    pub fn set_position_axis(&mut self, id: &str, axis: Axis, value: f64) -> bool {
        let Some(model) = self.get_mut(id) else {
            return false;
        };
        model.position[axis.index()] = if value.is_finite() { value } else { 0.0 };
        true
    }

    /// Set one rotation component in degrees. Non-finite input stores `0.0`.
    pub fn set_rotation_axis(&mut self, id: &str, axis: Axis, degrees: f64) -> bool {
        let Some(model) = self.get_mut(id) else {
            return false;
        };
        model.rotation[axis.index()] = if degrees.is_finite() { degrees } else { 0.0 };
        true
    }

    /// Full copy of every model for an overwrite save.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ModelConfig> {
        self.models.clone()
    }

    /// Serialize the snapshot as the persisted JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value, SceneError> {
        Ok(serde_json::to_value(&self.models)?)
    }
}
