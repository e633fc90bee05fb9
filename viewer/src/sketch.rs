//! Sketch export: the payload the host posts when a clinician saves their
//! annotations as a technical task.
//!
//! The serialized shape is the request body the service accepts:
//! `{ "cameraState", "canvasData", "svgContent" }`.

#[cfg(test)]
#[path = "sketch_test.rs"]
mod sketch_test;

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::camera::CameraHandle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchExport {
    /// Camera matrices and viewport at export time; `null` before the first frame.
    pub camera_state: Option<CameraHandle>,
    #[serde(rename = "canvasData")]
    pub annotations: Vec<Annotation>,
    pub svg_content: String,
}

impl SketchExport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Request body for the sketch save endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a value cannot be represented as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
