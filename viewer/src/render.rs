//! Rendering: paints the overlay display list onto a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a finished display list and produces pixels; it does not mutate
//! any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Point, Viewport};
use crate::overlay::OverlayItem;

/// Clear the overlay and draw `items` in order.
///
/// `viewport` is in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, items: &[OverlayItem], viewport: Viewport, dpr: f64) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    for item in items {
        draw_item(ctx, item)?;
    }
    Ok(())
}

fn draw_item(ctx: &CanvasRenderingContext2d, item: &OverlayItem) -> Result<(), JsValue> {
    match item {
        OverlayItem::Line { from, to, color, width } => {
            stroke_path(ctx, &[*from, *to], color, *width);
            Ok(())
        }
        OverlayItem::Polyline { points, color, width } => {
            stroke_path(ctx, points, color, *width);
            Ok(())
        }
        OverlayItem::Circle { center, radius, color, width } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, TAU)?;
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(*width);
            ctx.stroke();
            Ok(())
        }
        OverlayItem::Marker { at, radius, color } => {
            ctx.begin_path();
            ctx.arc(at.x, at.y, *radius, 0.0, TAU)?;
            ctx.set_fill_style_str(color);
            ctx.fill();
            Ok(())
        }
        OverlayItem::Label { at, text, color, font_px, bold } => {
            let weight = if *bold { "bold " } else { "" };
            ctx.set_font(&format!("{weight}{font_px}px sans-serif"));
            ctx.set_text_baseline("alphabetic");
            ctx.set_fill_style_str(color);
            ctx.fill_text(text, at.x, at.y)
        }
    }
}

fn stroke_path(ctx: &CanvasRenderingContext2d, points: &[Point], color: &str, width: f64) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    if rest.is_empty() {
        // Single sample: draw a zero-length segment so the round cap shows a dot.
        ctx.line_to(first.x, first.y);
    }
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.stroke();
}
