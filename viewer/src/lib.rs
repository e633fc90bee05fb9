//! Measurement and annotation engine for the dental model viewer.
//!
//! This crate is compiled to WebAssembly and runs in the browser, laid over the
//! 3D view that renders the patient's STL meshes. It turns pointer input on
//! the overlay into world-space measurements (distance, angle, diameter) and
//! freehand sketch strokes, keeps the resulting annotations with single-level
//! undo, and owns the per-mesh scene settings an administrator edits. The host
//! layer wires DOM events and the render engine's camera into the engine and
//! acts on the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] (tool state machine) |
//! | [`camera`] | Camera tracking and screen-to-world projection |
//! | [`measure`] | Pure metric calculators over world points |
//! | [`input`] | Tool kinds, buttons and the per-tool state |
//! | [`annotation`] | Completed annotations and the undo-only store |
//! | [`overlay`] | Display list built from annotations and in-progress buffers |
//! | [`render`] | Paints the display list onto a 2D canvas |
//! | [`svg`] | Serializes the display list as an SVG document |
//! | [`scene`] | Mesh settings: merge with saved state, admin edits, transforms |
//! | [`sketch`] | Sketch export payload |
//! | [`consts`] | Shared colors, sizes and projection constants |

pub mod annotation;
pub mod camera;
pub mod consts;
pub mod engine;
pub mod input;
pub mod measure;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod sketch;
pub mod svg;
