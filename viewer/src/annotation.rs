//! Completed annotations and the undo-only store that holds them.
//!
//! An [`Annotation`] is immutable once appended. Its position in the
//! [`AnnotationStore`] is its identity for rendering; the only mutation the
//! store allows is removing the newest entry.
//!
//! On the wire each annotation is `{ "type", "points", "value" }` (or
//! `"color"` for strokes), the same shape the sketch archive stores.

#[cfg(test)]
#[path = "annotation_test.rs"]
mod annotation_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::input::ToolKind;

/// One finished measurement or sketch stroke, in overlay pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    /// Two endpoints and the world distance between them.
    Ruler {
        points: [Point; 2],
        #[serde(rename = "value")]
        distance: f64,
    },
    /// First arm end, vertex, last arm end, and the angle at the vertex.
    Angle {
        points: [Point; 3],
        #[serde(rename = "value")]
        degrees: f64,
    },
    /// Center and rim point, and the world diameter.
    Circle {
        points: [Point; 2],
        #[serde(rename = "value")]
        diameter: f64,
    },
    /// A stroke path drawn with the freehand tool.
    #[serde(alias = "brush")]
    Freehand { points: Vec<Point>, color: String },
}

impl Annotation {
    /// The tool that produced this annotation.
    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Ruler { .. } => ToolKind::Ruler,
            Self::Angle { .. } => ToolKind::Angle,
            Self::Circle { .. } => ToolKind::Circle,
            Self::Freehand { .. } => ToolKind::Freehand,
        }
    }

    /// Screen points in the order they were collected.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        match self {
            Self::Ruler { points, .. } | Self::Circle { points, .. } => points.as_slice(),
            Self::Angle { points, .. } => points.as_slice(),
            Self::Freehand { points, .. } => points.as_slice(),
        }
    }

    /// The derived metric, if this variant carries one.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Ruler { distance, .. } => Some(*distance),
            Self::Angle { degrees, .. } => Some(*degrees),
            Self::Circle { diameter, .. } => Some(*diameter),
            Self::Freehand { .. } => None,
        }
    }
}

/// Ordered list of completed annotations. Append and truncate-last only.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    items: Vec<Annotation>,
}

impl AnnotationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed annotation.
    pub fn push(&mut self, annotation: Annotation) {
        self.items.push(annotation);
    }

    /// Remove and return the newest annotation.
    pub fn pop_last(&mut self) -> Option<Annotation> {
        self.items.pop()
    }

    /// All annotations, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
