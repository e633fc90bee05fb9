#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::camera::OrthoParams;
use crate::scene::MeshFile;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Orthographic camera mapping one pixel to one world unit on a 400×300 view
/// centred on the origin.
fn unit_camera() -> CameraHandle {
    CameraHandle::orthographic(OrthoParams::looking_down_z(Viewport::new(400.0, 300.0), 1.0, 100.0))
}

fn core_with_camera() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_viewport(400.0, 300.0, 1.0);
    core.set_camera(unit_camera());
    core
}

fn click(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_down(pt(x, y), Button::Primary);
    core.on_pointer_up(pt(x, y), Button::Primary)
}

fn added(actions: &[Action]) -> Option<&Annotation> {
    actions.iter().find_map(|a| match a {
        Action::AnnotationAdded(annotation) => Some(annotation),
        _ => None,
    })
}

// =============================================================
// Tool selection
// =============================================================

#[test]
fn new_core_is_idle_with_controls_enabled() {
    let core = EngineCore::new();
    assert_eq!(core.tool(), None);
    assert!(core.camera_controls_enabled());
    assert!(core.annotations().is_empty());
    assert!(core.camera().is_none());
}

#[test]
fn select_tool_disables_camera_controls_and_sets_crosshair() {
    let mut core = EngineCore::new();
    let actions = core.select_tool(Some(ToolKind::Ruler));
    assert_eq!(core.tool(), Some(ToolKind::Ruler));
    assert!(actions.contains(&Action::CameraControls { enabled: false }));
    assert!(actions.contains(&Action::SetCursor("crosshair".into())));
    assert!(!actions.contains(&Action::BufferCleared));
}

#[test]
fn reselecting_active_tool_toggles_it_off() {
    let mut core = EngineCore::new();
    core.select_tool(Some(ToolKind::Angle));
    let actions = core.select_tool(Some(ToolKind::Angle));
    assert_eq!(core.tool(), None);
    assert!(actions.contains(&Action::CameraControls { enabled: true }));
    assert!(actions.contains(&Action::SetCursor("default".into())));
}

#[test]
fn select_none_returns_to_idle() {
    let mut core = EngineCore::new();
    core.select_tool(Some(ToolKind::Circle));
    core.select_tool(None);
    assert_eq!(core.state, ToolState::Idle);
}

#[test]
fn switching_tool_discards_buffer() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 10.0, 10.0);
    assert_eq!(core.buffer(), &[pt(10.0, 10.0)]);

    let actions = core.select_tool(Some(ToolKind::Circle));
    assert!(actions.contains(&Action::BufferCleared));
    assert!(core.annotations().is_empty());
    assert_eq!(core.tool(), Some(ToolKind::Circle));
    assert!(core.buffer().is_empty());
}

#[test]
fn switching_tools_mid_buffer_never_appends() {
    let sequences: [(ToolKind, usize); 3] = [(ToolKind::Ruler, 1), (ToolKind::Circle, 1), (ToolKind::Angle, 2)];
    for (tool, clicks) in sequences {
        for next in [None, Some(ToolKind::Ruler), Some(ToolKind::Freehand), Some(tool)] {
            let mut core = core_with_camera();
            core.select_tool(Some(tool));
            for i in 0..clicks {
                click(&mut core, 20.0 * (i as f64 + 1.0), 40.0);
            }
            assert!(core.state.has_buffer());
            core.select_tool(next);
            assert!(core.annotations().is_empty(), "{tool:?} -> {next:?}");
            assert!(!core.state.has_buffer());
        }
    }
}

#[test]
fn switching_away_mid_stroke_discards_it() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Freehand));
    core.on_pointer_down(pt(1.0, 1.0), Button::Primary);
    core.on_pointer_move(pt(2.0, 2.0));
    core.select_tool(Some(ToolKind::Ruler));
    assert!(core.annotations().is_empty());
    assert!(!core.ui.pressed);
}

// =============================================================
// Ruler
// =============================================================

#[test]
fn ruler_measures_hundred_pixels_as_hundred_units() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));

    let first = click(&mut core, 100.0, 100.0);
    assert!(added(&first).is_none());
    let second = click(&mut core, 200.0, 100.0);

    let expected = Annotation::Ruler { points: [pt(100.0, 100.0), pt(200.0, 100.0)], distance: 100.0 };
    assert_eq!(added(&second), Some(&expected));
    assert_eq!(core.annotations(), &[expected]);
    assert!(core.buffer().is_empty());
    assert_eq!(core.tool(), Some(ToolKind::Ruler));
}

#[test]
fn ruler_respects_camera_zoom() {
    let mut core = EngineCore::new();
    core.set_camera(CameraHandle::orthographic(OrthoParams::looking_down_z(Viewport::new(400.0, 300.0), 4.0, 100.0)));
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 100.0, 100.0);
    let actions = click(&mut core, 200.0, 100.0);
    assert_eq!(added(&actions).and_then(Annotation::value), Some(25.0));
}

#[test]
fn ruler_same_point_twice_measures_zero() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 123.0, 45.0);
    let actions = click(&mut core, 123.0, 45.0);
    assert_eq!(added(&actions).and_then(Annotation::value), Some(0.0));
}

#[test]
fn ruler_without_camera_measures_zero() {
    let mut core = EngineCore::new();
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 0.0, 0.0);
    let actions = click(&mut core, 300.0, 200.0);
    assert_eq!(added(&actions).and_then(Annotation::value), Some(0.0));
}

#[test]
fn ruler_projects_both_clicks_through_final_camera() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 200.0, 150.0);
    // Camera slides 50 units right between the clicks; the buffer holds pixels.
    let mut moved = OrthoParams::looking_down_z(Viewport::new(400.0, 300.0), 1.0, 100.0);
    moved.eye.x = 50.0;
    moved.target.x = 50.0;
    core.set_camera(CameraHandle::orthographic(moved));
    assert_eq!(core.buffer(), &[Point::new(200.0, 150.0)]);
    let actions = click(&mut core, 200.0, 150.0);
    assert_eq!(added(&actions).and_then(Annotation::value), Some(0.0));
}

// =============================================================
// Angle / circle
// =============================================================

#[test]
fn angle_three_clicks_measure_right_angle() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Angle));
    // World (100, 0), origin, (0, 100).
    click(&mut core, 300.0, 150.0);
    click(&mut core, 200.0, 150.0);
    assert_eq!(core.buffer().len(), 2);
    let actions = click(&mut core, 200.0, 50.0);

    let Some(Annotation::Angle { points, degrees }) = added(&actions) else {
        panic!("expected an angle annotation, got {actions:?}");
    };
    assert!((degrees - 90.0).abs() < 1e-9);
    assert_eq!(points, &[pt(300.0, 150.0), pt(200.0, 150.0), pt(200.0, 50.0)]);
    assert!(core.buffer().is_empty());
}

#[test]
fn angle_with_coincident_arm_is_zero() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Angle));
    click(&mut core, 200.0, 150.0);
    click(&mut core, 200.0, 150.0);
    let actions = click(&mut core, 250.0, 100.0);
    assert_eq!(added(&actions).and_then(Annotation::value), Some(0.0));
}

#[test]
fn circle_emits_diameter() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Circle));
    click(&mut core, 200.0, 150.0);
    let actions = click(&mut core, 205.0, 150.0);
    let expected = Annotation::Circle { points: [pt(200.0, 150.0), pt(205.0, 150.0)], diameter: 10.0 };
    assert_eq!(added(&actions), Some(&expected));
}

// =============================================================
// Pointer semantics
// =============================================================

#[test]
fn idle_ignores_pointer_events() {
    let mut core = core_with_camera();
    assert!(core.on_pointer_down(pt(1.0, 1.0), Button::Primary).is_empty());
    assert!(core.on_pointer_move(pt(2.0, 2.0)).is_empty());
    assert!(core.on_pointer_up(pt(2.0, 2.0), Button::Primary).is_empty());
    assert!(core.annotations().is_empty());
}

#[test]
fn pointer_up_without_down_is_ignored() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    assert!(core.on_pointer_up(pt(5.0, 5.0), Button::Primary).is_empty());
    assert!(core.buffer().is_empty());
}

#[test]
fn secondary_button_is_ignored() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    core.on_pointer_down(pt(5.0, 5.0), Button::Secondary);
    core.on_pointer_up(pt(5.0, 5.0), Button::Secondary);
    assert!(core.buffer().is_empty());
}

#[test]
fn click_registers_at_release_point() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Circle));
    core.on_pointer_down(pt(5.0, 5.0), Button::Primary);
    core.on_pointer_up(pt(7.0, 9.0), Button::Primary);
    assert_eq!(core.buffer(), &[pt(7.0, 9.0)]);
}

#[test]
fn hover_tracks_only_with_buffer() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    assert!(core.on_pointer_move(pt(3.0, 3.0)).is_empty());
    assert_eq!(core.ui.hover, None);

    click(&mut core, 10.0, 10.0);
    assert_eq!(core.on_pointer_move(pt(30.0, 10.0)), vec![Action::RenderNeeded]);
    assert_eq!(core.ui.hover, Some(pt(30.0, 10.0)));
    assert_eq!(core.buffer(), &[pt(10.0, 10.0)]);

    click(&mut core, 30.0, 10.0);
    assert_eq!(core.ui.hover, None);
}

// =============================================================
// Freehand
// =============================================================

#[test]
fn freehand_drag_emits_stroke() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Freehand));
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    core.on_pointer_move(pt(1.0, 1.0));
    core.on_pointer_move(pt(2.0, 1.0));
    assert_eq!(core.buffer().len(), 3);
    let actions = core.on_pointer_up(pt(2.0, 1.0), Button::Primary);

    let expected = Annotation::Freehand { points: vec![pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 1.0)], color: "red".into() };
    assert_eq!(added(&actions), Some(&expected));
    assert!(core.buffer().is_empty());
    assert_eq!(core.tool(), Some(ToolKind::Freehand));
}

#[test]
fn freehand_move_without_press_does_nothing() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Freehand));
    assert!(core.on_pointer_move(pt(1.0, 1.0)).is_empty());
    assert!(core.buffer().is_empty());
}

#[test]
fn freehand_single_sample_still_emits() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Freehand));
    let actions = click(&mut core, 4.0, 4.0);
    assert_eq!(added(&actions).map(|a| a.points().len()), Some(1));
}

#[test]
fn freehand_uses_configured_color() {
    let mut core = core_with_camera();
    core.set_stroke_color("#00ff00");
    core.select_tool(Some(ToolKind::Freehand));
    let actions = click(&mut core, 4.0, 4.0);
    assert!(matches!(added(&actions), Some(Annotation::Freehand { color, .. }) if color == "#00ff00"));
}

// =============================================================
// Undo
// =============================================================

#[test]
fn undo_on_empty_state_is_noop() {
    let mut core = core_with_camera();
    assert!(core.undo().is_empty());
    assert!(core.undo().is_empty());
    assert!(core.annotations().is_empty());
}

#[test]
fn undo_clears_buffer_before_touching_store() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 0.0, 0.0);
    click(&mut core, 10.0, 0.0);
    click(&mut core, 50.0, 50.0);

    assert_eq!(core.undo(), vec![Action::BufferCleared, Action::RenderNeeded]);
    assert_eq!(core.annotations().len(), 1);
    assert!(core.buffer().is_empty());
    assert_eq!(core.tool(), Some(ToolKind::Ruler));

    let actions = core.undo();
    assert!(matches!(actions.first(), Some(Action::AnnotationRemoved(Annotation::Ruler { .. }))));
    assert!(core.annotations().is_empty());
}

#[test]
fn undo_pops_newest_first() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Freehand));
    click(&mut core, 1.0, 1.0);
    core.select_tool(Some(ToolKind::Circle));
    click(&mut core, 200.0, 150.0);
    click(&mut core, 210.0, 150.0);

    core.undo();
    assert_eq!(core.annotations().len(), 1);
    assert_eq!(core.annotations()[0].kind(), ToolKind::Freehand);
}

// =============================================================
// Scene / export
// =============================================================

#[test]
fn load_scene_merges_saved_state() {
    let mut core = EngineCore::new();
    let files = [MeshFile { id: "stl-0".into(), name: "upper.stl".into(), url: "u".into() }];
    core.load_scene(&files, &json!([{ "id": "stl-0", "visible": false }])).unwrap();
    assert!(!core.scene.models()[0].visible);
}

#[test]
fn load_scene_rejects_bad_state_and_keeps_previous_scene() {
    let mut core = EngineCore::new();
    let files = [MeshFile { id: "stl-0".into(), name: "upper.stl".into(), url: "u".into() }];
    core.load_scene(&files, &serde_json::Value::Null).unwrap();
    assert!(core.load_scene(&[], &json!({ "oops": true })).is_err());
    assert_eq!(core.scene.models().len(), 1);
}

#[test]
fn export_sketch_keeps_annotations() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 100.0, 100.0);
    click(&mut core, 200.0, 100.0);

    let export = core.export_sketch();
    assert_eq!(export.annotations.len(), 1);
    assert_eq!(export.camera_state, Some(unit_camera()));
    assert!(export.svg_content.starts_with("<svg"));
    assert!(export.svg_content.contains("100 mm"));
    assert_eq!(core.annotations().len(), 1);
}

#[test]
fn export_sketch_omits_in_progress_markers() {
    let mut core = core_with_camera();
    core.select_tool(Some(ToolKind::Ruler));
    click(&mut core, 100.0, 100.0);
    let export = core.export_sketch();
    assert!(export.annotations.is_empty());
    assert!(!export.svg_content.contains("<circle"));
}

#[test]
fn set_viewport_rejects_bad_dpr() {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0, 0.0);
    assert_eq!(core.dpr, 1.0);
    assert_eq!(core.viewport, Viewport::new(800.0, 600.0));
}
