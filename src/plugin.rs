//! Plugin for asynchronous blend map baking.
use bevy::prelude::*;

use crate::bake::BakeSettings;
use crate::baking::{TerrainBakeSystems, finish_blend_map_bakes, start_blend_map_bakes};

/// Plugin that bakes terrain blend maps off the main thread.
///
/// This plugin registers:
/// - The [`BakeSettings`] resource (defaults for every bake)
/// - Systems that start and collect bakes requested through
///   [`BakeBlendMaps`](crate::baking::BakeBlendMaps)
///
/// # Example
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_terrain_baker::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(TerrainBakerPlugin)
///     .insert_resource(BakeSettings::legacy())
///     .run();
/// ```
pub struct TerrainBakerPlugin;

impl Plugin for TerrainBakerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BakeSettings>()
            .register_type::<BakeSettings>()
            .add_systems(
                Update,
                (start_blend_map_bakes, finish_blend_map_bakes)
                    .chain()
                    .in_set(TerrainBakeSystems),
            );
    }
}
