//! Blend map baking kernel.
//!
//! This module turns an [`AlphaMapStack`] and a [`NormalMap`] into
//! [`BlendMaps`] in two passes over the grid:
//! - Pass 1 picks the two strongest layers and the projection axis per texel
//! - Pass 2 flags texels whose neighbors disagree on layer ids or axis
//!
//! Nothing here depends on ECS state; see [`crate::image`] for conversion to
//! and from Bevy images and [`crate::TerrainBakerPlugin`] for async baking.

mod axis;
mod baker;
mod grid;
mod neighborhood;
mod normal;
mod settings;
mod splat;
mod texel;
mod validation;

pub use axis::classify_axis;
pub use baker::{BakeStats, BlendMaps, bake_blend_maps};
pub use grid::BakeGrid;
pub use neighborhood::{NeighborMarks, examine_neighbors};
pub use normal::{NormalMap, decode_normal};
pub use settings::{BakeSettings, EmptyTexelAxis, IdComparison, LayerOverflow, Neighborhood};
pub use splat::{
    AlphaMapStack, CHANNELS_PER_LAYER, DominantPair, MAX_ALPHA_LAYERS, SplatSample, layer_id,
    select_dominant_pair,
};
pub use texel::{FLAG_BILINEAR, ProjectionAxis, Texel0, Texel1};
pub use validation::{BakeError, validate_inputs};
