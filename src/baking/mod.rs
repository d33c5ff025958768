//! Asynchronous blend map baking for Bevy apps.
//!
//! Spawn a [`BakeBlendMaps`] component referencing the alpha map and normal
//! map images. Once every image is loaded the bake runs on the
//! [`AsyncComputeTaskPool`](bevy::tasks::AsyncComputeTaskPool), and the
//! entity receives a [`BakedBlendMaps`] component holding the output images.

mod systems;

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::bake::{BakeError, BakeSettings, BakeStats, BlendMaps};

pub use systems::{TerrainBakeSystems, finish_blend_map_bakes, start_blend_map_bakes};

/// Request to bake blend maps from loaded images.
///
/// The component is removed when the bake finishes or its inputs are
/// rejected.
#[derive(Component, Clone, Debug)]
pub struct BakeBlendMaps {
    /// RGBA8 splat images in layer order.
    pub alpha_maps: Vec<Handle<Image>>,

    /// Color-encoded world-space normal map.
    pub normal_map: Handle<Image>,

    /// Overrides the [`BakeSettings`] resource for this bake.
    pub settings: Option<BakeSettings>,
}

impl BakeBlendMaps {
    pub fn new(alpha_maps: Vec<Handle<Image>>, normal_map: Handle<Image>) -> Self {
        Self {
            alpha_maps,
            normal_map,
            settings: None,
        }
    }

    pub fn with_settings(mut self, settings: BakeSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// In-flight bake for an entity.
#[derive(Component)]
pub struct BlendMapBakeTask(pub(crate) Task<Result<BlendMaps, BakeError>>);

/// Output of a finished bake.
#[derive(Component, Clone, Debug)]
pub struct BakedBlendMaps {
    /// Ids, secondary weight and flags (`Rgba8Unorm`).
    pub blend_map0: Handle<Image>,

    /// Normal and axis blend (`Rgba32Float`).
    pub blend_map1: Handle<Image>,

    pub stats: BakeStats,
}
