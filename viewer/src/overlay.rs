//! Overlay display list.
//!
//! [`build`] turns the annotation store and the active tool's buffer into a
//! flat list of [`OverlayItem`]s in draw order: completed annotations oldest
//! first, then in-progress markers on top. The list is pure data so the same
//! frame can be painted to a canvas ([`crate::render`]) or serialized as SVG
//! ([`crate::svg`]).

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use serde::Serialize;

use crate::annotation::Annotation;
use crate::camera::Point;
use crate::consts::{
    ANGLE_COLOR, CIRCLE_COLOR, CIRCLE_MARKER_COLOR, DISTANCE_UNIT, LABEL_FONT_PX, LABEL_OFFSET_PX, MARKER_RADIUS_PX,
    OVERLAY_STROKE_PX, RULER_COLOR, RULER_MARKER_COLOR,
};
use crate::input::{ToolState, UiState};

/// One primitive of the overlay, in overlay pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OverlayItem {
    Line { from: Point, to: Point, color: String, width: f64 },
    /// Unfilled circle outline.
    Circle { center: Point, radius: f64, color: String, width: f64 },
    /// Open path through `points`.
    Polyline { points: Vec<Point>, color: String, width: f64 },
    /// Filled dot marking a buffered click.
    Marker { at: Point, radius: f64, color: String },
    /// Text anchored at its left baseline.
    Label { at: Point, text: String, color: String, font_px: f64, bold: bool },
}

/// Build the display list for one frame.
#[must_use]
pub fn build(annotations: &[Annotation], state: &ToolState, ui: &UiState) -> Vec<OverlayItem> {
    let mut items = Vec::with_capacity(annotations.len() * 2 + 4);
    for annotation in annotations {
        push_annotation(&mut items, annotation);
    }
    push_in_progress(&mut items, state, ui);
    items
}

fn line(from: Point, to: Point, color: &str) -> OverlayItem {
    OverlayItem::Line { from, to, color: color.to_owned(), width: OVERLAY_STROKE_PX }
}

fn label(at: Point, text: String, color: &str, bold: bool) -> OverlayItem {
    OverlayItem::Label { at, text, color: color.to_owned(), font_px: LABEL_FONT_PX, bold }
}

fn marker(at: Point, color: &str) -> OverlayItem {
    OverlayItem::Marker { at, radius: MARKER_RADIUS_PX, color: color.to_owned() }
}

fn push_annotation(items: &mut Vec<OverlayItem>, annotation: &Annotation) {
    match annotation {
        Annotation::Ruler { points: [a, b], distance } => {
            items.push(line(*a, *b, RULER_COLOR));
            let at = Point::new(b.x + LABEL_OFFSET_PX, b.y);
            items.push(label(at, format!("{distance} {DISTANCE_UNIT}"), RULER_COLOR, true));
        }
        Annotation::Circle { points: [center, rim], diameter } => {
            items.push(OverlayItem::Circle {
                center: *center,
                radius: center.distance_to(*rim),
                color: CIRCLE_COLOR.to_owned(),
                width: OVERLAY_STROKE_PX,
            });
            items.push(label(*center, format!("Ø {diameter}"), CIRCLE_COLOR, true));
        }
        Annotation::Angle { points: [a, vertex, b], degrees } => {
            items.push(line(*a, *vertex, ANGLE_COLOR));
            items.push(line(*vertex, *b, ANGLE_COLOR));
            let at = Point::new(vertex.x + LABEL_OFFSET_PX, vertex.y - LABEL_OFFSET_PX);
            items.push(label(at, format!("{degrees}°"), ANGLE_COLOR, false));
        }
        Annotation::Freehand { points, color } => {
            if !points.is_empty() {
                items.push(OverlayItem::Polyline { points: points.clone(), color: color.clone(), width: OVERLAY_STROKE_PX });
            }
        }
    }
}

fn push_in_progress(items: &mut Vec<OverlayItem>, state: &ToolState, ui: &UiState) {
    let marker_color = match state {
        ToolState::Idle => return,
        ToolState::Sketching { stroke } => {
            if let Some(points) = stroke.as_ref().filter(|p| !p.is_empty()) {
                items.push(OverlayItem::Polyline {
                    points: points.clone(),
                    color: ui.stroke_color.clone(),
                    width: OVERLAY_STROKE_PX,
                });
            }
            return;
        }
        ToolState::CollectingRuler { .. } => RULER_MARKER_COLOR,
        ToolState::CollectingCircle { .. } => CIRCLE_MARKER_COLOR,
        ToolState::CollectingAngle { .. } => ANGLE_COLOR,
    };

    let buffer = state.buffer();
    // Rubber band from the newest click to the pointer.
    if let (Some(last), Some(hover)) = (buffer.last(), ui.hover) {
        items.push(OverlayItem::Line { from: *last, to: hover, color: marker_color.to_owned(), width: 1.0 });
    }
    items.extend(buffer.iter().map(|p| marker(*p, marker_color)));
}
