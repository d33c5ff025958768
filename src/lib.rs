//! # bevy_terrain_baker
//!
//! Offline baking of terrain blend maps for single-sample, multi-layer
//! terrain shading.
//!
//! ## Features
//!
//! - Reduces any number of RGBA splat maps to the two strongest layers per texel
//! - Picks a dominant triplanar projection axis per texel from the normal map
//! - Flags texels next to layer or axis boundaries for bilinear and axis blending
//! - Parallel two-pass bake with deterministic output
//! - Async baking of loaded [`Image`](bevy::image::Image) assets through
//!   [`TerrainBakerPlugin`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_terrain_baker::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TerrainBakerPlugin)
//!         .add_systems(Startup, setup)
//!         .add_systems(Update, report)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(BakeBlendMaps::new(
//!         vec![
//!             asset_server.load("terrain/splat0.png"),
//!             asset_server.load("terrain/splat1.png"),
//!         ],
//!         asset_server.load("terrain/normals.png"),
//!     ));
//! }
//!
//! fn report(baked: Query<&BakedBlendMaps, Added<BakedBlendMaps>>) {
//!     for maps in &baked {
//!         info!("Baked {} texels", maps.stats.texels);
//!     }
//! }
//! ```
//!
//! Without an app, call [`bake::bake_blend_maps`] directly.

pub mod bake;
pub mod baking;
pub mod image;
mod plugin;

pub use plugin::TerrainBakerPlugin;

pub mod prelude {
    pub use crate::bake::{
        AlphaMapStack, BakeError, BakeSettings, BakeStats, BlendMaps, EmptyTexelAxis,
        IdComparison, LayerOverflow, Neighborhood, NormalMap, ProjectionAxis, Texel0, Texel1,
        bake_blend_maps,
    };
    pub use crate::baking::{BakeBlendMaps, BakedBlendMaps, TerrainBakeSystems};
    pub use crate::image::{ImageInputError, alpha_stack_from_images, normal_map_from_image};
    pub use crate::plugin::TerrainBakerPlugin;
}
