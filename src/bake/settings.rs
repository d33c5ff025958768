//! Bake configuration.

use bevy::prelude::*;

/// Which neighbors the flagging pass compares a texel against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Neighborhood {
    /// All eight surrounding texels.
    #[default]
    Moore,
    /// The neighbor set existing baked assets were produced with: the four
    /// edge neighbors plus top-right (sampled twice), top-left and
    /// bottom-left. Bottom-right is never examined.
    Legacy,
}

/// How the flagging pass decides that a neighbor's layer ids differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum IdComparison {
    /// Primary differs or secondary differs.
    #[default]
    Symmetric,
    /// Primary differs, secondary differs, or the neighbor's primary differs
    /// from the center's secondary. Matches existing baked assets, but flags
    /// every blended texel even inside a uniform field.
    Legacy,
}

/// What to do with alpha layers whose ids don't fit the 8-bit id field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum LayerOverflow {
    /// Fail the bake with [`BakeError::TooManyLayers`](super::BakeError::TooManyLayers).
    #[default]
    Reject,
    /// Bake only the layers that fit and log a warning.
    Truncate,
}

/// Axis given to texels that no alpha layer covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum EmptyTexelAxis {
    /// Classify the axis from the texel's normal like any other texel.
    #[default]
    FromNormal,
    /// Leave the axis bits clear, which reads back as Y.
    Unset,
}

/// Settings for a blend map bake.
///
/// The defaults scan all eight neighbors with symmetric id comparison. Use
/// [`BakeSettings::legacy`] to reproduce the blend map 0 of previously baked
/// assets.
#[derive(Resource, Clone, Debug, PartialEq, Reflect)]
pub struct BakeSettings {
    /// Neighbor set used by the flagging pass.
    /// Default: [`Neighborhood::Moore`]
    pub neighborhood: Neighborhood,

    /// Id mismatch rule used by the flagging pass.
    /// Default: [`IdComparison::Symmetric`]
    pub id_comparison: IdComparison,

    /// Policy for stacks with more than 63 alpha maps.
    /// Default: [`LayerOverflow::Reject`]
    pub layer_overflow: LayerOverflow,

    /// Axis policy for texels without any alpha weight.
    /// Default: [`EmptyTexelAxis::FromNormal`]
    pub empty_texel_axis: EmptyTexelAxis,

    /// Run both passes on the rayon thread pool. Output is identical either way.
    /// Default: true
    pub parallel: bool,
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            neighborhood: Neighborhood::Moore,
            id_comparison: IdComparison::Symmetric,
            layer_overflow: LayerOverflow::Reject,
            empty_texel_axis: EmptyTexelAxis::FromNormal,
            parallel: true,
        }
    }
}

impl BakeSettings {
    /// Neighbor set, id rule and empty texel axis of previously baked assets.
    ///
    /// Blend map 0 matches those assets. Blend map 1 still holds the decoded
    /// normal rather than the color-encoded one they stored.
    pub fn legacy() -> Self {
        Self {
            neighborhood: Neighborhood::Legacy,
            id_comparison: IdComparison::Legacy,
            empty_texel_axis: EmptyTexelAxis::Unset,
            ..default()
        }
    }

    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    pub fn with_id_comparison(mut self, id_comparison: IdComparison) -> Self {
        self.id_comparison = id_comparison;
        self
    }

    pub fn with_layer_overflow(mut self, layer_overflow: LayerOverflow) -> Self {
        self.layer_overflow = layer_overflow;
        self
    }

    pub fn with_empty_texel_axis(mut self, empty_texel_axis: EmptyTexelAxis) -> Self {
        self.empty_texel_axis = empty_texel_axis;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
