//! Camera reference tracking and screen-to-world projection.
//!
//! The render engine owns the orthographic camera; this module keeps a copy of
//! whatever camera is live right now ([`CameraTracker`]) and maps overlay pixel
//! coordinates into world space through it ([`project`]). Projection never
//! fails: with no camera registered, or a camera whose projection cannot be
//! inverted, the result is the world origin. Two samples that both degrade this
//! way measure as zero, which is the intended startup behavior.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{DMat4, DVec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::consts::UNPROJECT_NDC_DEPTH;

/// A point in overlay pixel space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pixel distance to another screen point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A coordinate in the scene's world space (millimetres by convention).
pub type WorldPoint = DVec3;

/// Pixel dimensions of the 3D view (and of the overlay laid over it).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are positive and finite.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Map a pixel position to normalized device coordinates. Pixel Y grows
    /// downward while device Y grows upward, hence the flip.
    #[must_use]
    pub fn to_ndc(&self, screen: Point) -> (f64, f64) {
        let ndc_x = (screen.x / self.width) * 2.0 - 1.0;
        let ndc_y = -(screen.y / self.height) * 2.0 + 1.0;
        (ndc_x, ndc_y)
    }

    /// Inverse of [`Viewport::to_ndc`].
    #[must_use]
    pub fn from_ndc(&self, ndc_x: f64, ndc_y: f64) -> Point {
        Point { x: (ndc_x + 1.0) * 0.5 * self.width, y: (1.0 - ndc_y) * 0.5 * self.height }
    }
}

/// Parameters for building an orthographic camera the way the render engine
/// sets up its default one: a pixel-sized frustum scaled down by `zoom`.
#[derive(Debug, Clone, Copy)]
pub struct OrthoParams {
    pub viewport: Viewport,
    /// Frustum scale; 2.0 shows half as many world units per pixel.
    pub zoom: f64,
    pub near: f64,
    pub far: f64,
    pub eye: DVec3,
    pub target: DVec3,
    pub up: DVec3,
}

impl OrthoParams {
    /// Camera on the +Z axis at `distance` looking at the origin, Y up.
    #[must_use]
    pub fn looking_down_z(viewport: Viewport, zoom: f64, distance: f64) -> Self {
        Self {
            viewport,
            zoom,
            near: 0.1,
            far: 1000.0,
            eye: DVec3::new(0.0, 0.0, distance),
            target: DVec3::ZERO,
            up: DVec3::Y,
        }
    }
}

/// Snapshot of the live camera: its projection, its placement in the world,
/// and the pixel size of the view it renders into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraHandle {
    /// Camera space to clip space.
    pub projection: DMat4,
    /// Camera space to world space (the camera's world matrix).
    pub camera_world: DMat4,
    pub viewport: Viewport,
}

impl CameraHandle {
    /// Wrap raw matrices reported by the render engine.
    #[must_use]
    pub fn from_matrices(projection: DMat4, camera_world: DMat4, viewport: Viewport) -> Self {
        Self { projection, camera_world, viewport }
    }

    /// Build an orthographic camera from frustum parameters.
    #[must_use]
    pub fn orthographic(params: OrthoParams) -> Self {
        let zoom = if params.zoom > 0.0 { params.zoom } else { 1.0 };
        let half_w = params.viewport.width * 0.5 / zoom;
        let half_h = params.viewport.height * 0.5 / zoom;
        let projection = DMat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, params.near, params.far);
        let view = DMat4::look_at_rh(params.eye, params.target, params.up);
        Self { projection, camera_world: view.inverse(), viewport: params.viewport }
    }

    /// Clip space to world space, or `None` if the projection is singular.
    #[must_use]
    pub fn unproject_matrix(&self) -> Option<DMat4> {
        let det = self.projection.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(self.camera_world * self.projection.inverse())
    }

    /// Unproject a pixel position at mid device depth.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Option<WorldPoint> {
        if !self.viewport.is_usable() {
            return None;
        }
        let unproject = self.unproject_matrix()?;
        let (ndc_x, ndc_y) = self.viewport.to_ndc(screen);
        let world = unproject.project_point3(DVec3::new(ndc_x, ndc_y, UNPROJECT_NDC_DEPTH));
        world.is_finite().then_some(world)
    }

    /// Project a world position back into overlay pixels.
    #[must_use]
    pub fn world_to_screen(&self, world: WorldPoint) -> Option<Point> {
        if !self.viewport.is_usable() {
            return None;
        }
        let view = self.camera_world.inverse();
        let ndc = (self.projection * view).project_point3(world);
        if !ndc.is_finite() {
            return None;
        }
        Some(self.viewport.from_ndc(ndc.x, ndc.y))
    }
}

/// Map a screen point to world space through `camera`.
///
/// Degrades to the origin when no camera is registered yet or the camera
/// cannot be inverted.
#[must_use]
pub fn project(screen: Point, camera: Option<&CameraHandle>) -> WorldPoint {
    let Some(camera) = camera else {
        warn!("projection requested before a camera was registered; using origin");
        return DVec3::ZERO;
    };
    camera.screen_to_world(screen).unwrap_or_else(|| {
        warn!("camera projection is not invertible; using origin");
        DVec3::ZERO
    })
}

/// Holds the render engine's currently active camera.
///
/// Written only by the camera lifecycle hook ([`CameraTracker::set`]), read by
/// every projection. Empty until the first frame mounts a camera.
#[derive(Debug, Clone, Default)]
pub struct CameraTracker {
    current: Option<CameraHandle>,
    generation: u64,
}

impl CameraTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live camera, if one has been registered.
    #[must_use]
    pub fn current(&self) -> Option<&CameraHandle> {
        self.current.as_ref()
    }

    /// Number of camera registrations seen so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a new active camera. Called on first mount and every swap.
    pub fn set(&mut self, handle: CameraHandle) {
        self.generation += 1;
        debug!(
            "camera registered (generation {}, viewport {}x{})",
            self.generation, handle.viewport.width, handle.viewport.height
        );
        self.current = Some(handle);
    }

    /// Forget the active camera (render engine unmounted).
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Project through whatever camera is live at the moment of the call.
    #[must_use]
    pub fn project(&self, screen: Point) -> WorldPoint {
        project(screen, self.current.as_ref())
    }
}
