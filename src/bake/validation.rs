//! Bake input validation.

use bevy::prelude::*;
use thiserror::Error;

use super::settings::{BakeSettings, LayerOverflow};
use super::splat::{AlphaMapStack, CHANNELS_PER_LAYER, MAX_ALPHA_LAYERS};
use super::NormalMap;

/// Errors that reject a bake before it starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BakeError {
    #[error("Bake resolution must be greater than zero")]
    ZeroResolution,

    #[error("Alpha map stack has no layers")]
    NoLayers,

    #[error(
        "Too many alpha map layers: {layers} layers need {ids} ids, the id field holds {max} layers",
        ids = .layers * CHANNELS_PER_LAYER
    )]
    TooManyLayers { layers: usize, max: usize },

    #[error("Alpha map layer {layer} has {found} texels, expected {expected}")]
    LayerSizeMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },

    #[error("Normal map has {found} texels, expected {expected}")]
    NormalSizeMismatch { expected: usize, found: usize },

    #[error("Normal map resolution {found} does not match alpha map resolution {expected}")]
    ResolutionMismatch { expected: u32, found: u32 },
}

/// Checks the configuration-level preconditions of a bake.
///
/// Returns the number of alpha layers the bake will read, which is smaller
/// than the stack's layer count only under [`LayerOverflow::Truncate`].
pub fn validate_inputs(
    alpha_maps: &AlphaMapStack,
    normals: &NormalMap,
    settings: &BakeSettings,
) -> Result<usize, BakeError> {
    if alpha_maps.grid().is_empty() {
        return Err(BakeError::ZeroResolution);
    }

    if normals.resolution() != alpha_maps.resolution() {
        return Err(BakeError::ResolutionMismatch {
            expected: alpha_maps.resolution(),
            found: normals.resolution(),
        });
    }

    let expected = alpha_maps.grid().len();
    if normals.len() != expected {
        return Err(BakeError::NormalSizeMismatch {
            expected,
            found: normals.len(),
        });
    }

    let layers = alpha_maps.layer_count();
    if layers == 0 {
        return Err(BakeError::NoLayers);
    }

    if layers > MAX_ALPHA_LAYERS {
        match settings.layer_overflow {
            LayerOverflow::Reject => {
                return Err(BakeError::TooManyLayers {
                    layers,
                    max: MAX_ALPHA_LAYERS,
                });
            }
            LayerOverflow::Truncate => {
                warn!(
                    "Alpha map stack has {} layers, only the first {} fit the id field; ignoring the rest",
                    layers, MAX_ALPHA_LAYERS
                );
                return Ok(MAX_ALPHA_LAYERS);
            }
        }
    }

    Ok(layers)
}
