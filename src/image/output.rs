//! Exporting baked blend maps as Bevy images.

use bevy::asset::RenderAssetUsages;
use bevy::image::{Image, ImageAddressMode, ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::bake::BlendMaps;

impl BlendMaps {
    /// Blend map 0 as a linear `Rgba8Unorm` image without mips.
    pub fn blend_map0_image(&self) -> Image {
        blend_image(
            self.resolution(),
            self.blend_map0_bytes().to_vec(),
            TextureFormat::Rgba8Unorm,
        )
    }

    /// Blend map 1 as an `Rgba32Float` image without mips.
    pub fn blend_map1_image(&self) -> Image {
        blend_image(
            self.resolution(),
            self.blend_map1_bytes().to_vec(),
            TextureFormat::Rgba32Float,
        )
    }

    /// Color preview of the baked flags.
    ///
    /// Axis maps to a hue (X red, Y green, Z blue). Bilinear texels are
    /// brightened and axis blend texels are pulled toward white.
    #[cfg(feature = "debug_viz")]
    pub fn debug_image(&self) -> Image {
        use crate::bake::ProjectionAxis;

        let data = self
            .blend_map0()
            .iter()
            .zip(self.blend_map1())
            .flat_map(|(texel0, texel1)| {
                let mut rgb: [u8; 3] = match texel0.axis() {
                    ProjectionAxis::X => [160, 32, 32],
                    ProjectionAxis::Y => [32, 160, 32],
                    ProjectionAxis::Z => [32, 32, 160],
                };
                if texel0.needs_bilinear() {
                    rgb = rgb.map(|c| c.saturating_add(64));
                }
                if texel1.needs_axis_blend() {
                    rgb = rgb.map(|c| c / 2 + 127);
                }
                [rgb[0], rgb[1], rgb[2], 255]
            })
            .collect();

        blend_image(self.resolution(), data, TextureFormat::Rgba8UnormSrgb)
    }
}

/// Wraps texel bytes in an image sampled with nearest filtering, so layer
/// ids and flags are never interpolated by the sampler.
fn blend_image(resolution: u32, data: Vec<u8>, format: TextureFormat) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: resolution,
            height: resolution,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        format,
        RenderAssetUsages::default(),
    );

    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::ClampToEdge,
        address_mode_v: ImageAddressMode::ClampToEdge,
        mag_filter: ImageFilterMode::Nearest,
        min_filter: ImageFilterMode::Nearest,
        mipmap_filter: ImageFilterMode::Nearest,
        ..default()
    });

    image
}
