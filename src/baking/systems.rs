//! Systems driving asynchronous bakes.

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, block_on, futures_lite::future};

use super::{BakeBlendMaps, BakedBlendMaps, BlendMapBakeTask};
use crate::bake::{BakeSettings, bake_blend_maps};
use crate::image::{ImageInputError, alpha_stack_from_images, normal_map_from_image};

/// System set for blend map baking systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerrainBakeSystems;

/// Starts a bake for every request whose images are all loaded.
///
/// Requests with invalid images are logged and dropped. Requests still
/// waiting on an image are retried next frame.
pub fn start_blend_map_bakes(
    mut commands: Commands,
    requests: Query<(Entity, &BakeBlendMaps), Without<BlendMapBakeTask>>,
    images: Res<Assets<Image>>,
    default_settings: Res<BakeSettings>,
) {
    for (entity, request) in &requests {
        let Some(normal_image) = images.get(&request.normal_map) else {
            continue;
        };
        let Some(alpha_images) = request
            .alpha_maps
            .iter()
            .map(|handle| images.get(handle))
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };

        let inputs = alpha_stack_from_images(&alpha_images).and_then(|alpha| {
            let normals = normal_map_from_image(normal_image)?;
            Ok::<_, ImageInputError>((alpha, normals))
        });
        let (alpha, normals) = match inputs {
            Ok(inputs) => inputs,
            Err(e) => {
                error!("Rejected blend map bake for {:?}: {}", entity, e);
                commands.entity(entity).remove::<BakeBlendMaps>();
                continue;
            }
        };

        let settings = request
            .settings
            .clone()
            .unwrap_or_else(|| default_settings.clone());

        debug!(
            "Starting blend map bake for {:?} ({} alpha layers)",
            entity,
            alpha.layer_count()
        );
        let task = AsyncComputeTaskPool::get()
            .spawn(async move { bake_blend_maps(&alpha, &normals, &settings) });
        commands.entity(entity).insert(BlendMapBakeTask(task));
    }
}

/// Collects finished bakes and publishes their images.
pub fn finish_blend_map_bakes(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut BlendMapBakeTask)>,
    mut images: ResMut<Assets<Image>>,
) {
    for (entity, mut task) in &mut tasks {
        let Some(result) = block_on(future::poll_once(&mut task.0)) else {
            continue;
        };

        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<(BakeBlendMaps, BlendMapBakeTask)>();

        match result {
            Ok(maps) => {
                entity_commands.insert(BakedBlendMaps {
                    blend_map0: images.add(maps.blend_map0_image()),
                    blend_map1: images.add(maps.blend_map1_image()),
                    stats: *maps.stats(),
                });
            }
            Err(e) => {
                error!("Blend map bake for {:?} failed: {}", entity, e);
            }
        }
    }
}
