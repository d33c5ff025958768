//! Headless bake of procedurally generated terrain inputs.
//!
//! Builds two splat images (eight layers) and a normal map for a bumpy
//! hillside, bakes them through [`TerrainBakerPlugin`] and prints the bake
//! statistics. Pass `--legacy` to bake with the legacy neighbor rules.

use std::f32::consts::TAU;

use bevy::asset::RenderAssetUsages;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_terrain_baker::prelude::*;

const RESOLUTION: u32 = 256;

fn main() {
    let settings = if std::env::args().any(|arg| arg == "--legacy") {
        BakeSettings::legacy()
    } else {
        BakeSettings::default()
    };

    App::new()
        .add_plugins((MinimalPlugins, LogPlugin::default(), AssetPlugin::default()))
        .init_asset::<Image>()
        .add_plugins(TerrainBakerPlugin)
        .insert_resource(settings)
        .add_systems(Startup, setup)
        .add_systems(Update, report.after(TerrainBakeSystems))
        .run();
}

/// Height of the synthetic hillside in `[0, 1]`
fn height(x: f32, y: f32) -> f32 {
    let u = x / RESOLUTION as f32;
    let v = y / RESOLUTION as f32;
    0.5 + 0.3 * (u * TAU).sin() * (v * TAU * 0.5).cos() + 0.2 * (u * v * TAU * 3.0).sin()
}

/// Splat weights for eight layers, banded by height with soft transitions
fn layer_weights(x: u32, y: u32) -> [u8; 8] {
    let h = height(x as f32, y as f32).clamp(0.0, 1.0) * 7.0;
    let mut weights = [0u8; 8];
    let lower = h.floor() as usize;
    let t = h - h.floor();
    weights[lower.min(7)] = ((1.0 - t) * 255.0) as u8;
    if lower < 7 {
        weights[lower + 1] = (t * 255.0) as u8;
    }
    weights
}

fn splat_image(half: usize) -> Image {
    let mut data = Vec::with_capacity((RESOLUTION * RESOLUTION * 4) as usize);
    for y in 0..RESOLUTION {
        for x in 0..RESOLUTION {
            let weights = layer_weights(x, y);
            data.extend_from_slice(&weights[half * 4..half * 4 + 4]);
        }
    }
    rgba8_image(data)
}

fn normal_image() -> Image {
    let mut data = Vec::with_capacity((RESOLUTION * RESOLUTION * 4) as usize);
    for y in 0..RESOLUTION {
        for x in 0..RESOLUTION {
            let (fx, fy) = (x as f32, y as f32);
            let dx = height(fx + 1.0, fy) - height(fx - 1.0, fy);
            let dz = height(fx, fy + 1.0) - height(fx, fy - 1.0);
            // Exaggerate slopes so cliffs switch to side projections
            let normal = Vec3::new(-dx * 120.0, 1.0, -dz * 120.0).normalize();
            let encoded = (normal * 0.5 + 0.5) * 255.0;
            data.extend_from_slice(&[encoded.x as u8, encoded.y as u8, encoded.z as u8, 255]);
        }
    }
    rgba8_image(data)
}

fn rgba8_image(data: Vec<u8>) -> Image {
    Image::new(
        Extent3d {
            width: RESOLUTION,
            height: RESOLUTION,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::default(),
    )
}

fn setup(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let alpha_maps = vec![images.add(splat_image(0)), images.add(splat_image(1))];
    let normal_map = images.add(normal_image());

    info!("Requesting {RESOLUTION}x{RESOLUTION} bake with 8 layers");
    commands.spawn(BakeBlendMaps::new(alpha_maps, normal_map));
}

fn report(
    baked: Query<&BakedBlendMaps, Added<BakedBlendMaps>>,
    pending: Query<(), With<BakeBlendMaps>>,
    mut exit: MessageWriter<AppExit>,
) {
    for maps in &baked {
        let stats = &maps.stats;
        info!(
            "Baked {} texels from {} layers in {:?}",
            stats.texels, stats.layers, stats.elapsed
        );
        info!(
            "  blended: {}, bilinear: {}, axis blend: {}, empty: {}",
            stats.blended_texels, stats.bilinear_texels, stats.axis_blend_texels, stats.empty_texels
        );
        info!(
            "  axis X/Y/Z: {}/{}/{}",
            stats.axis_counts[0], stats.axis_counts[1], stats.axis_counts[2]
        );
    }

    if pending.is_empty() {
        exit.write(AppExit::Success);
    }
}
