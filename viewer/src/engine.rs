//! Tool state machine and the browser-facing engine wrapper.
//!
//! [`EngineCore`] owns everything the overlay needs: the camera tracker, the
//! annotation store, the active [`ToolState`], transient [`UiState`] and the
//! admin-editable [`Scene`]. Every pointer event drives at most one state
//! transition synchronously and returns the [`Action`]s the host must act on.
//! [`Engine`] adds the canvas element and paints the overlay.

use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::annotation::{Annotation, AnnotationStore};
use crate::camera::{CameraHandle, CameraTracker, Point, Viewport};
use crate::input::{Button, ToolKind, ToolState, UiState};
use crate::measure;
use crate::overlay::{self, OverlayItem};
use crate::render;
use crate::scene::{self, MeshFile, Scene, SceneError};
use crate::sketch::SketchExport;
use crate::svg;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A measurement or stroke was completed and appended to the store.
    AnnotationAdded(Annotation),
    /// Undo removed the newest annotation.
    AnnotationRemoved(Annotation),
    /// An in-progress point buffer was discarded.
    BufferCleared,
    /// Orbit/pan/zoom camera controls should be switched on or off.
    CameraControls { enabled: bool },
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub tracker: CameraTracker,
    pub store: AnnotationStore,
    pub state: ToolState,
    pub ui: UiState,
    pub scene: Scene,
    /// Overlay size in CSS pixels.
    pub viewport: Viewport,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            tracker: CameraTracker::new(),
            store: AnnotationStore::new(),
            state: ToolState::Idle,
            ui: UiState::default(),
            scene: Scene::new(),
            viewport: Viewport::new(0.0, 0.0),
            dpr: 1.0,
        }
    }
}

fn cursor_for(tool: Option<ToolKind>) -> &'static str {
    if tool.is_some() { "crosshair" } else { "default" }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Camera / viewport ---

    /// Register the render engine's live camera. Called on mount and on every swap.
    pub fn set_camera(&mut self, handle: CameraHandle) {
        self.tracker.set(handle);
    }

    /// Forget the camera when the render engine unmounts.
    pub fn clear_camera(&mut self) {
        self.tracker.clear();
    }

    /// Update overlay dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport = Viewport::new(width_css, height_css);
        self.dpr = if dpr > 0.0 && dpr.is_finite() { dpr } else { 1.0 };
    }

    // --- Tool selection ---

    /// Activate `tool`. Selecting the tool that is already active turns it off.
    /// Any in-progress buffer is discarded without emitting an annotation.
    pub fn select_tool(&mut self, tool: Option<ToolKind>) -> Vec<Action> {
        let next = if tool == self.state.tool() { None } else { tool };
        let had_buffer = self.state.has_buffer();

        self.state = ToolState::for_tool(next);
        self.ui.hover = None;
        self.ui.pressed = false;
        debug!("tool selected: {}", next.map_or("none", ToolKind::as_str));

        let mut actions = Vec::with_capacity(4);
        if had_buffer {
            actions.push(Action::BufferCleared);
        }
        actions.push(Action::CameraControls { enabled: next.is_none() });
        actions.push(Action::SetCursor(cursor_for(next).to_owned()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Color given to freehand strokes started from now on.
    pub fn set_stroke_color(&mut self, color: &str) {
        color.clone_into(&mut self.ui.stroke_color);
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match &mut self.state {
            ToolState::Idle => Vec::new(),
            ToolState::Sketching { stroke } => {
                *stroke = Some(vec![screen_pt]);
                self.ui.pressed = true;
                vec![Action::RenderNeeded]
            }
            ToolState::CollectingRuler { .. } | ToolState::CollectingAngle { .. } | ToolState::CollectingCircle { .. } => {
                self.ui.pressed = true;
                Vec::new()
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match &mut self.state {
            ToolState::Idle | ToolState::Sketching { stroke: None } => Vec::new(),
            ToolState::Sketching { stroke: Some(points) } => {
                points.push(screen_pt);
                vec![Action::RenderNeeded]
            }
            ToolState::CollectingRuler { .. } | ToolState::CollectingAngle { .. } | ToolState::CollectingCircle { .. } => {
                if !self.state.has_buffer() {
                    return Vec::new();
                }
                self.ui.hover = Some(screen_pt);
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let was_pressed = std::mem::replace(&mut self.ui.pressed, false);
        if !was_pressed {
            return Vec::new();
        }

        let completed = match self.state {
            ToolState::Idle => return Vec::new(),
            ToolState::Sketching { .. } => self.finish_stroke(),
            _ => self.register_click(screen_pt),
        };

        let Some(annotation) = completed else {
            return vec![Action::RenderNeeded];
        };
        self.ui.hover = None;
        debug!("annotation completed: {} ({} points)", annotation.kind().as_str(), annotation.points().len());
        self.store.push(annotation.clone());
        vec![Action::AnnotationAdded(annotation), Action::RenderNeeded]
    }

    /// Feed one click to a click tool. Returns the annotation when the click
    /// completes it; the buffer is then empty again.
    fn register_click(&mut self, pt: Point) -> Option<Annotation> {
        let tracker = &self.tracker;
        match &mut self.state {
            ToolState::Idle | ToolState::Sketching { .. } => None,
            ToolState::CollectingRuler { start } => match start.take() {
                None => {
                    *start = Some(pt);
                    None
                }
                Some(first) => Some(Annotation::Ruler {
                    points: [first, pt],
                    distance: measure::distance(tracker.project(first), tracker.project(pt)),
                }),
            },
            ToolState::CollectingCircle { center } => match center.take() {
                None => {
                    *center = Some(pt);
                    None
                }
                Some(middle) => Some(Annotation::Circle {
                    points: [middle, pt],
                    diameter: measure::diameter(tracker.project(middle), tracker.project(pt)),
                }),
            },
            ToolState::CollectingAngle { points } => {
                let collected = std::mem::take(points);
                if let &[first, vertex] = collected.as_slice() {
                    let degrees = measure::angle(tracker.project(first), tracker.project(vertex), tracker.project(pt));
                    Some(Annotation::Angle { points: [first, vertex, pt], degrees })
                } else {
                    *points = collected;
                    points.push(pt);
                    None
                }
            }
        }
    }

    fn finish_stroke(&mut self) -> Option<Annotation> {
        let ToolState::Sketching { stroke } = &mut self.state else {
            return None;
        };
        let points = stroke.take()?;
        Some(Annotation::Freehand { points, color: self.ui.stroke_color.clone() })
    }

    // --- Undo ---

    /// Cancel the in-progress buffer if there is one, otherwise remove the
    /// newest annotation. No-op when both are empty.
    pub fn undo(&mut self) -> Vec<Action> {
        if self.state.has_buffer() {
            self.state.clear_buffer();
            self.ui.hover = None;
            self.ui.pressed = false;
            return vec![Action::BufferCleared, Action::RenderNeeded];
        }
        match self.store.pop_last() {
            Some(removed) => vec![Action::AnnotationRemoved(removed), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    // --- Scene ---

    /// Rebuild the scene from a fresh file listing and the persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError`] if the saved state cannot be decoded; the
    /// current scene is left untouched.
    pub fn load_scene(&mut self, files: &[MeshFile], saved_state: &serde_json::Value) -> Result<(), SceneError> {
        let saved = scene::parse_saved_state(saved_state).inspect_err(|e| warn!("rejecting saved scene state: {e}"))?;
        self.scene = Scene::load(files, &saved);
        debug!("scene loaded: {} models", self.scene.models().len());
        Ok(())
    }

    // --- Export ---

    /// Camera state, annotations and an SVG rendering of the annotations.
    /// The store is left as is.
    #[must_use]
    pub fn export_sketch(&self) -> SketchExport {
        let items = overlay::build(self.store.as_slice(), &ToolState::Idle, &self.ui);
        SketchExport {
            camera_state: self.tracker.current().copied(),
            annotations: self.store.as_slice().to_vec(),
            svg_content: svg::to_svg(&items, self.viewport.width, self.viewport.height),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        self.store.as_slice()
    }

    #[must_use]
    pub fn tool(&self) -> Option<ToolKind> {
        self.state.tool()
    }

    /// Points collected toward the next annotation.
    #[must_use]
    pub fn buffer(&self) -> &[Point] {
        self.state.buffer()
    }

    #[must_use]
    pub fn camera(&self) -> Option<&CameraHandle> {
        self.tracker.current()
    }

    /// Whether the render engine's camera controls should be live.
    #[must_use]
    pub fn camera_controls_enabled(&self) -> bool {
        self.state.tool().is_none()
    }

    /// Display list for the current frame.
    #[must_use]
    pub fn overlay(&self) -> Vec<OverlayItem> {
        overlay::build(self.store.as_slice(), &self.state, &self.ui)
    }
}

/// The full overlay engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas cannot provide a 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx, core: EngineCore::new() })
    }

    // --- Delegated inputs ---

    pub fn set_camera(&mut self, handle: CameraHandle) {
        self.core.set_camera(handle);
    }

    pub fn clear_camera(&mut self) {
        self.core.clear_camera();
    }

    /// Resize the backing store to match the CSS size at the given pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        let scale = self.core.dpr;
        self.canvas.set_width(device_pixels(width_css * scale));
        self.canvas.set_height(device_pixels(height_css * scale));
    }

    pub fn select_tool(&mut self, tool: Option<ToolKind>) -> Vec<Action> {
        self.core.select_tool(tool)
    }

    pub fn set_stroke_color(&mut self, color: &str) {
        self.core.set_stroke_color(color);
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        self.core.undo()
    }

    /// # Errors
    ///
    /// See [`EngineCore::load_scene`].
    pub fn load_scene(&mut self, files: &[MeshFile], saved_state: &serde_json::Value) -> Result<(), SceneError> {
        self.core.load_scene(files, saved_state)
    }

    // --- Render ---

    /// Draw the current overlay to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let items = self.core.overlay();
        render::draw(&self.ctx, &items, self.core.viewport, self.core.dpr)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn export_sketch(&self) -> SketchExport {
        self.core.export_sketch()
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        self.core.annotations()
    }

    #[must_use]
    pub fn tool(&self) -> Option<ToolKind> {
        self.core.tool()
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.core.scene
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_pixels(css: f64) -> u32 {
    if css.is_finite() && css > 0.0 { css.round().min(f64::from(u32::MAX)) as u32 } else { 0 }
}
