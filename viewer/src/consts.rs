//! Shared numeric and color constants for the viewer crate.

// ── Projection ──────────────────────────────────────────────────

/// Device-space depth used when unprojecting a pointer sample. Any value in
/// the clip range works for an orthographic camera; mid-depth keeps it inside.
pub const UNPROJECT_NDC_DEPTH: f64 = 0.5;

// ── Scene defaults ──────────────────────────────────────────────

/// Mesh color applied to models with no saved configuration.
pub const DEFAULT_MODEL_COLOR: &str = "#cccccc";

/// Mesh opacity applied to models with no saved configuration.
pub const DEFAULT_MODEL_OPACITY: f64 = 1.0;

// ── Overlay styling ─────────────────────────────────────────────

/// Ruler line and label color.
pub const RULER_COLOR: &str = "#3b82f6";

/// Circle outline and label color.
pub const CIRCLE_COLOR: &str = "#ef4444";

/// Angle arms and label color.
pub const ANGLE_COLOR: &str = "yellow";

/// Default freehand stroke color.
pub const FREEHAND_COLOR: &str = "red";

/// In-progress ruler marker fill.
pub const RULER_MARKER_COLOR: &str = "blue";

/// In-progress circle marker fill.
pub const CIRCLE_MARKER_COLOR: &str = "red";

/// Stroke width for every overlay line, in screen pixels.
pub const OVERLAY_STROKE_PX: f64 = 2.0;

/// Radius of in-progress point markers, in screen pixels.
pub const MARKER_RADIUS_PX: f64 = 3.0;

/// Label font size, in screen pixels.
pub const LABEL_FONT_PX: f64 = 16.0;

/// Horizontal offset of ruler and angle labels from their anchor point.
pub const LABEL_OFFSET_PX: f64 = 10.0;

/// Unit suffix appended to ruler labels.
pub const DISTANCE_UNIT: &str = "mm";
