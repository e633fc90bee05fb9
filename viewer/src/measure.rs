//! Metric calculators over projected world points.
//!
//! Every function here takes world-space input only, so tests can exercise the
//! math without a camera. Results are rounded to one decimal, the precision
//! shown on the overlay and stored on annotations.

#[cfg(test)]
#[path = "measure_test.rs"]
mod measure_test;

use crate::camera::WorldPoint;

/// Round to one decimal place.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Euclidean distance in world units, rounded to one decimal.
#[must_use]
pub fn distance(a: WorldPoint, b: WorldPoint) -> f64 {
    round_tenth(a.distance(b))
}

/// Angle at `vertex` between the arms toward `a` and `b`, in degrees
/// (`0..=180`, one decimal).
///
/// A zero-length arm yields `0.0`.
#[must_use]
pub fn angle(a: WorldPoint, vertex: WorldPoint, b: WorldPoint) -> f64 {
    let (Some(d1), Some(d2)) = (direction(a - vertex), direction(b - vertex)) else {
        return 0.0;
    };
    let cos = d1.dot(d2).clamp(-1.0, 1.0);
    round_tenth(cos.acos().to_degrees())
}

/// Unit vector along `v`, or `None` for a zero or non-finite arm.
///
/// Scales by the largest component before normalizing so that arms far from
/// unit length neither underflow nor overflow the squared norm.
fn direction(v: WorldPoint) -> Option<WorldPoint> {
    let scale = v.abs().max_element();
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    Some((v / scale).normalize())
}

/// Circle diameter from its center and a rim point: twice the rounded radius.
#[must_use]
pub fn diameter(center: WorldPoint, rim: WorldPoint) -> f64 {
    2.0 * distance(center, rim)
}
