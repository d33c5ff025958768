//! Reading bake inputs from Bevy images.

use bevy::image::Image;
use bevy::prelude::*;
use bevy::render::render_resource::{TextureDimension, TextureFormat};
use thiserror::Error;

use crate::bake::{AlphaMapStack, BakeError, NormalMap, decode_normal};

/// Errors that can occur when converting images into bake inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageInputError {
    #[error("{name} has no CPU-side pixel data")]
    MissingData { name: String },

    #[error("{name} must be a 2D texture, got {found:?}")]
    NotTwoDimensional {
        name: String,
        found: TextureDimension,
    },

    #[error("{name} is not square: {width}x{height}")]
    NotSquare {
        name: String,
        width: u32,
        height: u32,
    },

    #[error("{name} is {found}x{found}, expected {expected}x{expected}")]
    SizeMismatch {
        name: String,
        expected: u32,
        found: u32,
    },

    #[error("{name} has no array layers")]
    NoArrayLayers { name: String },

    #[error("{name} has unsupported format {found:?}")]
    UnsupportedFormat { name: String, found: TextureFormat },

    #[error("{name} holds {found} bytes of pixel data, expected {expected}")]
    DataLength {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Bake(#[from] BakeError),
}

/// Returns `true` for formats accepted as alpha (splat) maps.
pub fn is_valid_alpha_format(format: TextureFormat) -> bool {
    matches!(
        format,
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb
    )
}

/// Builds an alpha map stack from RGBA8 splat images, one image per layer.
///
/// All images must be square, 2D and the same size. Layer ids follow the
/// slice order: image `n` channel `c` becomes layer id `n * 4 + c`.
pub fn alpha_stack_from_images(images: &[&Image]) -> Result<AlphaMapStack, ImageInputError> {
    let mut stack: Option<AlphaMapStack> = None;

    for (layer, image) in images.iter().enumerate() {
        let name = format!("Alpha map {layer}");
        let size = square_size(image, &name)?;
        let stack = stack.get_or_insert_with(|| AlphaMapStack::new(size));
        if size != stack.resolution() {
            return Err(ImageInputError::SizeMismatch {
                name,
                expected: stack.resolution(),
                found: size,
            });
        }
        if !is_valid_alpha_format(image.texture_descriptor.format) {
            return Err(ImageInputError::UnsupportedFormat {
                name,
                found: image.texture_descriptor.format,
            });
        }

        let layers = image.texture_descriptor.size.depth_or_array_layers as usize;
        if layers == 0 {
            return Err(ImageInputError::NoArrayLayers { name });
        }
        let data = pixel_data(image, &name, size, 4 * layers)?;
        for chunk in data.chunks_exact(data.len() / layers) {
            stack.push_layer(rgba8_texels(chunk))?;
        }
    }

    stack.ok_or(ImageInputError::Bake(BakeError::NoLayers))
}

/// Decodes a color-encoded normal map (`[0, 1]` per channel) to world normals.
///
/// Accepts `Rgba8Unorm`, `Rgba16Unorm` and `Rgba32Float`. Alpha is ignored.
pub fn normal_map_from_image(image: &Image) -> Result<NormalMap, ImageInputError> {
    let name = "Normal map";
    let size = square_size(image, name)?;
    if image.texture_descriptor.size.depth_or_array_layers != 1 {
        return Err(ImageInputError::NotTwoDimensional {
            name: name.into(),
            found: image.texture_descriptor.dimension,
        });
    }

    let format = image.texture_descriptor.format;
    let encoded: Vec<Vec3> = match format {
        TextureFormat::Rgba8Unorm => pixel_data(image, name, size, 4)?
            .chunks_exact(4)
            .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32) / 255.0)
            .collect(),
        TextureFormat::Rgba16Unorm => pixel_data(image, name, size, 8)?
            .chunks_exact(8)
            .map(|p| {
                let c = |i: usize| u16::from_le_bytes([p[i], p[i + 1]]) as f32;
                Vec3::new(c(0), c(2), c(4)) / 65535.0
            })
            .collect(),
        TextureFormat::Rgba32Float => pixel_data(image, name, size, 16)?
            .chunks_exact(16)
            .map(|p| {
                let c = |i: usize| f32::from_le_bytes([p[i], p[i + 1], p[i + 2], p[i + 3]]);
                Vec3::new(c(0), c(4), c(8))
            })
            .collect(),
        found => {
            return Err(ImageInputError::UnsupportedFormat {
                name: name.into(),
                found,
            });
        }
    };

    Ok(NormalMap::from_vec(
        size,
        encoded.into_iter().map(decode_normal).collect(),
    ))
}

fn square_size(image: &Image, name: &str) -> Result<u32, ImageInputError> {
    if image.texture_descriptor.dimension != TextureDimension::D2 {
        return Err(ImageInputError::NotTwoDimensional {
            name: name.into(),
            found: image.texture_descriptor.dimension,
        });
    }

    let width = image.texture_descriptor.size.width;
    let height = image.texture_descriptor.size.height;
    if width != height {
        return Err(ImageInputError::NotSquare {
            name: name.into(),
            width,
            height,
        });
    }
    if width == 0 {
        return Err(ImageInputError::Bake(BakeError::ZeroResolution));
    }

    Ok(width)
}

fn pixel_data<'a>(
    image: &'a Image,
    name: &str,
    size: u32,
    bytes_per_texel: usize,
) -> Result<&'a [u8], ImageInputError> {
    let data = image
        .data
        .as_deref()
        .ok_or_else(|| ImageInputError::MissingData { name: name.into() })?;

    let expected = (size as usize) * (size as usize) * bytes_per_texel;
    if data.len() != expected {
        return Err(ImageInputError::DataLength {
            name: name.into(),
            expected,
            found: data.len(),
        });
    }
    Ok(data)
}

fn rgba8_texels(bytes: &[u8]) -> Vec<[u8; 4]> {
    bytes
        .chunks_exact(4)
        .map(|p| [p[0], p[1], p[2], p[3]])
        .collect()
}
