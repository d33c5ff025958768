//! Neighborhood comparison for the flagging pass.

use bevy::prelude::*;

use super::grid::BakeGrid;
use super::settings::{IdComparison, Neighborhood};
use super::texel::Texel0;

/// Right, left, top, bottom, top-right, top-left, top-right, bottom-left.
const LEGACY_OFFSETS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 1),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
    IVec2::new(-1, -1),
];

const MOORE_OFFSETS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 1),
    IVec2::new(-1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, -1),
];

impl Neighborhood {
    /// Offsets sampled around a texel.
    pub const fn offsets(self) -> &'static [IVec2; 8] {
        match self {
            Self::Legacy => &LEGACY_OFFSETS,
            Self::Moore => &MOORE_OFFSETS,
        }
    }
}

impl IdComparison {
    /// Returns `true` if `neighbor` disagrees with `center` on layer ids.
    #[inline]
    pub fn ids_differ(self, center: &Texel0, neighbor: &Texel0) -> bool {
        let differ = neighbor.primary_id != center.primary_id
            || neighbor.secondary_id != center.secondary_id;
        match self {
            Self::Legacy => differ || neighbor.primary_id != center.secondary_id,
            Self::Symmetric => differ,
        }
    }
}

/// Result of comparing one texel against its neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborMarks {
    /// Some neighbor has different layer ids.
    pub bilinear: bool,
    /// Some neighbor projects along a different axis.
    pub axis_blend: bool,
}

/// Compares the texel at `(x, y)` against its neighbors in `map0`.
///
/// Neighbor lookups are clamped, so border texels compare against
/// edge-replicated neighbors. `map0` must hold the completed first pass.
pub fn examine_neighbors(
    map0: &[Texel0],
    grid: BakeGrid,
    x: u32,
    y: u32,
    neighborhood: Neighborhood,
    id_comparison: IdComparison,
) -> NeighborMarks {
    let center = &map0[grid.index(x, y)];
    let center_axis = center.axis();
    let pos = IVec2::new(x as i32, y as i32);

    let mut marks = NeighborMarks::default();
    for offset in neighborhood.offsets() {
        let p = pos + *offset;
        let neighbor = &map0[grid.clamped_index(p.x, p.y)];

        marks.bilinear |= id_comparison.ids_differ(center, neighbor);
        marks.axis_blend |= neighbor.axis() != center_axis;

        if marks.bilinear && marks.axis_blend {
            break;
        }
    }
    marks
}
