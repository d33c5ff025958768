//! Packed per-texel blend map data.
//!
//! Blend map 0 channels (RGBA8):
//! - R: primary layer id
//! - G: secondary layer id
//! - B: secondary weight
//! - A: flags (`00000bxz`)
//!
//! Blend map 1 channels (RGBA32F):
//! - RGB: world-space normal
//! - A: axis blend (0.0 or 1.0)

use bevy::prelude::*;
use bytemuck::{Pod, Zeroable};

/// World axis used for planar UV projection of a texel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ProjectionAxis {
    X,
    #[default]
    Y,
    Z,
}

impl ProjectionAxis {
    /// Flag bit set when the axis is Z.
    pub const FLAG_Z: u8 = 1 << 0;
    /// Flag bit set when the axis is X.
    pub const FLAG_X: u8 = 1 << 1;
    /// Mask covering both axis bits.
    pub const MASK: u8 = Self::FLAG_Z | Self::FLAG_X;

    /// Axis bits for the flags byte. Y encodes as zero.
    #[inline]
    pub const fn to_bits(self) -> u8 {
        match self {
            Self::X => Self::FLAG_X,
            Self::Y => 0,
            Self::Z => Self::FLAG_Z,
        }
    }

    /// Decodes the axis from a flags byte, ignoring non-axis bits.
    ///
    /// The Z bit wins if both axis bits are set.
    #[inline]
    pub const fn from_bits(flags: u8) -> Self {
        if flags & Self::FLAG_Z != 0 {
            Self::Z
        } else if flags & Self::FLAG_X != 0 {
            Self::X
        } else {
            Self::Y
        }
    }
}

/// Flag bit set by the neighborhood pass when ids differ around a texel.
pub const FLAG_BILINEAR: u8 = 1 << 2;

/// One texel of blend map 0.
///
/// Layout matches an `Rgba8Unorm` pixel so a buffer of these can be cast
/// directly to image bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Texel0 {
    pub primary_id: u8,
    pub secondary_id: u8,
    pub secondary_weight: u8,
    pub flags: u8,
}

impl Texel0 {
    #[inline]
    pub const fn axis(&self) -> ProjectionAxis {
        ProjectionAxis::from_bits(self.flags)
    }

    /// Replaces the axis bits, keeping every other flag.
    #[inline]
    pub fn set_axis(&mut self, axis: ProjectionAxis) {
        self.flags = (self.flags & !ProjectionAxis::MASK) | axis.to_bits();
    }

    #[inline]
    pub const fn needs_bilinear(&self) -> bool {
        self.flags & FLAG_BILINEAR != 0
    }

    #[inline]
    pub fn mark_bilinear(&mut self) {
        self.flags |= FLAG_BILINEAR;
    }

    /// Returns `true` if the texel blends two distinct layers.
    #[inline]
    pub const fn is_blended(&self) -> bool {
        self.secondary_weight > 0
    }
}

/// One texel of blend map 1.
///
/// Layout matches an `Rgba32Float` pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Texel1 {
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
    pub axis_blend: f32,
}

impl Texel1 {
    #[inline]
    pub fn from_normal(normal: Vec3) -> Self {
        Self {
            nx: normal.x,
            ny: normal.y,
            nz: normal.z,
            axis_blend: 0.0,
        }
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.nx, self.ny, self.nz)
    }

    #[inline]
    pub fn needs_axis_blend(&self) -> bool {
        self.axis_blend > 0.0
    }
}
