//! Point arithmetic and distance metrics
//!
//! glam provides the vector backend; on targets with SIMD support its
//! arithmetic is vectorized, elsewhere it falls back to scalar code.

use crate::core::types::Point;

/// A distance-like function between two points
pub type Metric = fn(Point, Point) -> f32;

/// Component-wise sum of two points
#[inline]
pub fn sum(a: Point, b: Point) -> Point {
    a + b
}

/// Squared Euclidean distance
#[inline]
pub fn sqr_metric(a: Point, b: Point) -> f32 {
    (a - b).length_squared()
}

/// Sum of absolute by-coordinate differences (L1 distance).
///
/// Cheaper than the Euclidean metric and good enough to order points that
/// lie on a common ray.
#[inline]
pub fn abs_metric(a: Point, b: Point) -> f32 {
    let d = (a - b).abs();
    d.x + d.y + d.z
}

/// Point of `points` closest to `origin` under `metric`.
///
/// Ties go to the point that comes first.
pub fn closest_in_set(points: &[Point], metric: Metric, origin: Point) -> Option<Point> {
    let mut best: Option<(Point, f32)> = None;
    for &p in points {
        let dist = metric(origin, p);
        match best {
            Some((_, best_dist)) if best_dist <= dist => {}
            _ => best = Some((p, dist)),
        }
    }
    best.map(|(p, _)| p)
}
