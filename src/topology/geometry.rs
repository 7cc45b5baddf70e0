//! Distance helpers for router and client placement.

use crate::common::Point2D;

/// Euclidean distance in world units.
pub fn distance(a: &Point2D, b: &Point2D) -> f64 {
    distance2(a, b).sqrt()
}

/// Squared Euclidean distance, for ordering comparisons that need no sqrt.
pub fn distance2(a: &Point2D, b: &Point2D) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Inclusive range test: is `p` within `radius` of `center`?
pub fn within_radius(center: &Point2D, p: &Point2D, radius: f64) -> bool {
    distance(center, p) <= radius
}
