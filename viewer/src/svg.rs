//! SVG serialization of the overlay display list.
//!
//! Produces a standalone document sized to the overlay so an exported sketch
//! can be opened on its own, without the 3D view underneath.

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use crate::camera::Point;
use crate::overlay::OverlayItem;

/// Render `items` as an `<svg>` document of `width` × `height` pixels.
#[must_use]
pub fn to_svg(items: &[OverlayItem], width: f64, height: f64) -> String {
    let mut out = String::with_capacity(128 + items.len() * 96);
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = dimension(width),
        h = dimension(height),
    ));
    for item in items {
        out.push_str(&element(item));
    }
    out.push_str("</svg>");
    out
}

fn dimension(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

fn element(item: &OverlayItem) -> String {
    match item {
        OverlayItem::Line { from, to, color, width } => format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{width}"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            escape(color),
        ),
        OverlayItem::Circle { center, radius, color, width } => format!(
            r#"<circle cx="{}" cy="{}" r="{radius}" stroke="{}" stroke-width="{width}" fill="none"/>"#,
            center.x,
            center.y,
            escape(color),
        ),
        OverlayItem::Polyline { points, color, width } => format!(
            r#"<path d="{}" stroke="{}" stroke-width="{width}" fill="none"/>"#,
            path_data(points),
            escape(color),
        ),
        OverlayItem::Marker { at, radius, color } => {
            format!(r#"<circle cx="{}" cy="{}" r="{radius}" fill="{}"/>"#, at.x, at.y, escape(color))
        }
        OverlayItem::Label { at, text, color, font_px, bold } => {
            let weight = if *bold { r#" font-weight="bold""# } else { "" };
            format!(
                r#"<text x="{}" y="{}" fill="{}" font-size="{font_px}"{weight}>{}</text>"#,
                at.x,
                at.y,
                escape(color),
                escape(text),
            )
        }
    }
}

/// `M x y L x y ...` through every point.
fn path_data(points: &[Point]) -> String {
    let segments: Vec<String> = points.iter().map(|p| format!("{} {}", p.x, p.y)).collect();
    format!("M {}", segments.join(" L "))
}

/// Escape text for use in XML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
