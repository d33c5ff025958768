//! Per-texel world-space normals.

use bevy::prelude::*;

use super::grid::BakeGrid;

/// Decodes a `[0, 1]` color-encoded normal to `[-1, 1]`.
#[inline]
pub fn decode_normal(encoded: Vec3) -> Vec3 {
    encoded * 2.0 - Vec3::ONE
}

/// R×R grid of decoded normals.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalMap {
    grid: BakeGrid,
    data: Vec<Vec3>,
}

impl NormalMap {
    /// Creates a map with every normal pointing up.
    pub fn new(resolution: u32) -> Self {
        Self::filled(resolution, Vec3::Y)
    }

    pub fn filled(resolution: u32, normal: Vec3) -> Self {
        let grid = BakeGrid::new(resolution);
        Self {
            grid,
            data: vec![normal; grid.len()],
        }
    }

    /// Wraps already decoded normals. The length is checked when baking.
    pub fn from_vec(resolution: u32, data: Vec<Vec3>) -> Self {
        Self {
            grid: BakeGrid::new(resolution),
            data,
        }
    }

    /// Decodes `[0, 1]` color-encoded normals.
    pub fn from_encoded(resolution: u32, encoded: &[Vec3]) -> Self {
        Self::from_vec(resolution, encoded.iter().copied().map(decode_normal).collect())
    }

    pub fn from_fn<F>(resolution: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Vec3,
    {
        let grid = BakeGrid::new(resolution);
        let data = grid.positions().map(|p| f(p.x, p.y)).collect();
        Self { grid, data }
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.grid.resolution()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.data[self.grid.index(x, y)]
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vec3] {
        &self.data
    }
}
