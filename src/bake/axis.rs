//! Projection axis classification.

use bevy::prelude::*;

use super::texel::ProjectionAxis;

/// Picks the planar projection axis for a normal.
///
/// X or Z win only when strictly more aligned than both other axes. Every
/// other case, ties included, falls back to Y.
pub fn classify_axis(normal: Vec3) -> ProjectionAxis {
    let facing = normal.abs();

    if facing.x > facing.y && facing.x > facing.z {
        ProjectionAxis::X
    } else if facing.z > facing.x && facing.z > facing.y {
        ProjectionAxis::Z
    } else {
        ProjectionAxis::Y
    }
}
