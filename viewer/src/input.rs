//! Input model: measurement tools, mouse buttons, and the per-tool state machine.
//!
//! `ToolKind` names what the clinician picked from the toolbar. `ToolState` is
//! the active tool together with whatever points it has collected so far; a
//! tool with an empty buffer and `Idle` are the only resting states. `UiState`
//! carries the transient pointer context the overlay needs but the store never
//! sees (hover position, whether the button is held, stroke color).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::FREEHAND_COLOR;

/// A measurement or sketch tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Two clicks, emits a distance.
    Ruler,
    /// Three clicks (first, vertex, last), emits an angle.
    Angle,
    /// Two clicks (center, rim), emits a diameter.
    Circle,
    /// Press-drag-release, emits a stroke.
    Freehand,
}

impl ToolKind {
    /// Parse the identifier the host toolbar sends.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ruler" => Some(Self::Ruler),
            "angle" => Some(Self::Angle),
            "circle" => Some(Self::Circle),
            "freehand" | "brush" => Some(Self::Freehand),
            _ => None,
        }
    }

    /// Identifier used when reporting state back to the host.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ruler => "ruler",
            Self::Angle => "angle",
            Self::Circle => "circle",
            Self::Freehand => "freehand",
        }
    }

    /// Clicks that complete one measurement; `None` for drag tools.
    #[must_use]
    pub fn clicks_needed(self) -> Option<usize> {
        match self {
            Self::Ruler | Self::Circle => Some(2),
            Self::Angle => Some(3),
            Self::Freehand => None,
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// The active tool and its in-progress point buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolState {
    /// No tool; the render engine's camera controls own the pointer.
    #[default]
    Idle,
    /// Ruler waiting for its first or second click.
    CollectingRuler {
        /// First endpoint once clicked.
        start: Option<Point>,
    },
    /// Angle collecting up to two points before the third completes it.
    CollectingAngle {
        /// First arm end, then vertex.
        points: Vec<Point>,
    },
    /// Circle waiting for its center or rim click.
    CollectingCircle {
        /// Center once clicked.
        center: Option<Point>,
    },
    /// Freehand tool; `stroke` is `Some` while the pointer is held.
    Sketching {
        /// Samples of the stroke being drawn.
        stroke: Option<Vec<Point>>,
    },
}

impl ToolState {
    /// Fresh state with an empty buffer for `tool`.
    #[must_use]
    pub fn for_tool(tool: Option<ToolKind>) -> Self {
        match tool {
            None => Self::Idle,
            Some(ToolKind::Ruler) => Self::CollectingRuler { start: None },
            Some(ToolKind::Angle) => Self::CollectingAngle { points: Vec::new() },
            Some(ToolKind::Circle) => Self::CollectingCircle { center: None },
            Some(ToolKind::Freehand) => Self::Sketching { stroke: None },
        }
    }

    /// Which tool this state belongs to.
    #[must_use]
    pub fn tool(&self) -> Option<ToolKind> {
        match self {
            Self::Idle => None,
            Self::CollectingRuler { .. } => Some(ToolKind::Ruler),
            Self::CollectingAngle { .. } => Some(ToolKind::Angle),
            Self::CollectingCircle { .. } => Some(ToolKind::Circle),
            Self::Sketching { .. } => Some(ToolKind::Freehand),
        }
    }

    /// Points collected toward the next annotation.
    #[must_use]
    pub fn buffer(&self) -> &[Point] {
        match self {
            Self::Idle => &[],
            Self::CollectingRuler { start } => start.as_slice(),
            Self::CollectingCircle { center } => center.as_slice(),
            Self::CollectingAngle { points } => points,
            Self::Sketching { stroke } => stroke.as_deref().unwrap_or(&[]),
        }
    }

    /// Whether any point is buffered.
    #[must_use]
    pub fn has_buffer(&self) -> bool {
        !self.buffer().is_empty()
    }

    /// Drop buffered points, keeping the same tool selected.
    pub fn clear_buffer(&mut self) {
        *self = Self::for_tool(self.tool());
    }
}

/// Transient pointer context visible to the overlay.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Last pointer position while a click tool has a partial buffer.
    pub hover: Option<Point>,
    /// Whether the primary button went down over the overlay and has not been released.
    pub pressed: bool,
    /// Color assigned to new freehand strokes.
    pub stroke_color: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self { hover: None, pressed: false, stroke_color: FREEHAND_COLOR.to_owned() }
    }
}
