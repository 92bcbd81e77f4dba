//! Padded quadrilateral containment.
//!
//! Plots are four corners on the map plane (X/Z). A query point is inside
//! when it lies on the same side of all four edges of the quad after each
//! corner has been pushed `padding` units away from the centroid.

use bevy::math::Vec2;

/// Four corners of a plot, in dataset order (either winding).
pub type Quad = [Vec2; 4];

/// Arithmetic mean of the four corners.
pub fn centroid(quad: &Quad) -> Vec2 {
    (quad[0] + quad[1] + quad[2] + quad[3]) / 4.0
}

/// Push each corner outward from the centroid by `padding`.
///
/// A corner sitting on the centroid has no outward direction and is left
/// where it is.
pub fn padded(quad: &Quad, padding: f32) -> Quad {
    let center = centroid(quad);
    quad.map(|corner| corner + (corner - center).normalize_or_zero() * padding)
}

/// Whether `point` is inside `quad` grown by `padding`.
pub fn contains(quad: &Quad, point: Vec2, padding: f32) -> bool {
    let corners = padded(quad, padding);

    let mut left = true;
    let mut right = true;
    for i in 0..4 {
        let start = corners[i];
        let edge = corners[(i + 1) % 4] - start;
        let cross = edge.perp_dot(point - start);
        left &= cross >= 0.0;
        right &= cross <= 0.0;
    }
    left || right
}
