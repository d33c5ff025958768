//! Square bake grid with row-major flat indexing.

use bevy::prelude::*;

/// Dimensions of an R×R bake grid.
///
/// Every buffer the baker touches (alpha layers, normals, both blend maps)
/// is a flat `Vec` indexed through this type, so all of them agree on layout.
///
/// # Example
///
/// ```
/// use bevy_terrain_baker::bake::BakeGrid;
///
/// let grid = BakeGrid::new(4);
/// assert_eq!(grid.index(1, 2), 9);
/// assert_eq!(grid.clamped_index(-1, 5), grid.index(0, 3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BakeGrid {
    resolution: u32,
}

impl BakeGrid {
    pub const fn new(resolution: u32) -> Self {
        Self { resolution }
    }

    #[inline]
    pub const fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Number of texels in the grid.
    #[inline]
    pub const fn len(&self) -> usize {
        (self.resolution as usize) * (self.resolution as usize)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.resolution == 0
    }

    #[inline]
    pub const fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.resolution as usize
    }

    /// Flat index after clamping each coordinate to `[0, R-1]`.
    ///
    /// Border texels therefore see themselves (or the edge row/column) in
    /// place of out-of-range neighbors.
    #[inline]
    pub fn clamped_index(&self, x: i32, y: i32) -> usize {
        let max = self.resolution as i32 - 1;
        self.index(x.clamp(0, max) as u32, y.clamp(0, max) as u32)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub const fn coords(&self, index: usize) -> UVec2 {
        let r = self.resolution as usize;
        UVec2::new((index % r) as u32, (index / r) as u32)
    }

    /// Iterates all coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = UVec2> + use<> {
        let r = self.resolution;
        (0..r).flat_map(move |y| (0..r).map(move |x| UVec2::new(x, y)))
    }
}
