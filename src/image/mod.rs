//! Conversion between Bevy images and bake buffers.
//!
//! Alpha maps must be RGBA8 (linear or sRGB). Normal maps may be RGBA8,
//! RGBA16 or RGBA32F and are color-encoded (`n * 0.5 + 0.5`). Baked maps are
//! exported as `Rgba8Unorm` (blend map 0) and `Rgba32Float` (blend map 1).

mod input;
mod output;

pub use input::{
    ImageInputError, alpha_stack_from_images, is_valid_alpha_format, normal_map_from_image,
};
