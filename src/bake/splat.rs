//! Splat sample extraction and dominant pair selection.

use std::cmp::Ordering;

use super::grid::BakeGrid;
use super::validation::BakeError;

/// Number of weight channels in one alpha map image.
pub const CHANNELS_PER_LAYER: usize = 4;

/// Maximum number of alpha map images whose ids fit the 8-bit id field
/// (`layers * 4 <= 255`).
pub const MAX_ALPHA_LAYERS: usize = 255 / CHANNELS_PER_LAYER;

/// Layer id of a channel in the alpha map stack.
#[inline]
pub const fn layer_id(layer: usize, channel: usize) -> u8 {
    (layer * CHANNELS_PER_LAYER + channel) as u8
}

/// A nonzero `(layer id, weight)` pair read from one alpha map channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SplatSample {
    pub id: u8,
    pub weight: u8,
}

impl SplatSample {
    pub const fn new(id: u8, weight: u8) -> Self {
        Self { id, weight }
    }

    /// Ranking order: heavier first, lower id first on equal weight.
    #[inline]
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// The two strongest layers at a texel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DominantPair {
    pub primary_id: u8,
    pub secondary_id: u8,
    pub secondary_weight: u8,
}

/// Stack of RGBA8 alpha maps sharing one resolution.
///
/// Layer `n` channel `c` holds the weight of layer id `n * 4 + c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMapStack {
    grid: BakeGrid,
    layers: Vec<Vec<[u8; 4]>>,
}

impl AlphaMapStack {
    /// Creates an empty stack for an R×R grid.
    pub fn new(resolution: u32) -> Self {
        Self {
            grid: BakeGrid::new(resolution),
            layers: Vec::new(),
        }
    }

    /// Builds a stack from pre-rasterized layers.
    pub fn from_layers(resolution: u32, layers: Vec<Vec<[u8; 4]>>) -> Result<Self, BakeError> {
        let mut stack = Self::new(resolution);
        for layer in layers {
            stack.push_layer(layer)?;
        }
        Ok(stack)
    }

    /// Appends a layer, checking that it covers the whole grid.
    pub fn push_layer(&mut self, texels: Vec<[u8; 4]>) -> Result<(), BakeError> {
        let expected = self.grid.len();
        if texels.len() != expected {
            return Err(BakeError::LayerSizeMismatch {
                layer: self.layers.len(),
                expected,
                found: texels.len(),
            });
        }
        self.layers.push(texels);
        Ok(())
    }

    /// Appends a layer whose weights come from a sampler function.
    pub fn push_layer_with<F>(&mut self, mut sampler: F)
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let texels = self.grid.positions().map(|p| sampler(p.x, p.y)).collect();
        self.layers.push(texels);
    }

    #[inline]
    pub fn grid(&self) -> BakeGrid {
        self.grid
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.grid.resolution()
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Raw channel weights of one layer at a flat index.
    #[inline]
    pub fn texel(&self, layer: usize, index: usize) -> [u8; 4] {
        self.layers[layer][index]
    }

    /// Appends every nonzero channel at `index` to `out`, in ascending id order.
    ///
    /// `out` is not cleared first. Layers past [`MAX_ALPHA_LAYERS`] are never
    /// read, so ids cannot wrap.
    pub fn gather_samples(&self, index: usize, out: &mut Vec<SplatSample>) {
        for (layer, texels) in self.layers.iter().take(MAX_ALPHA_LAYERS).enumerate() {
            for (channel, &weight) in texels[index].iter().enumerate() {
                if weight > 0 {
                    out.push(SplatSample::new(layer_id(layer, channel), weight));
                }
            }
        }
    }

    /// Convenience wrapper around [`gather_samples`](Self::gather_samples).
    pub fn samples_at(&self, x: u32, y: u32) -> Vec<SplatSample> {
        let mut out = Vec::with_capacity(self.layers.len() * CHANNELS_PER_LAYER);
        self.gather_samples(self.grid.index(x, y), &mut out);
        out
    }
}

/// Picks the primary and secondary layers from a texel's samples.
///
/// Returns `None` for an empty sample set. Samples are ranked by weight,
/// heaviest first; equal weights rank the lower id first so bakes are
/// reproducible. The secondary falls back to the primary when there is no
/// second sample with a nonzero weight.
pub fn select_dominant_pair(samples: &[SplatSample]) -> Option<DominantPair> {
    let mut first: Option<SplatSample> = None;
    let mut second: Option<SplatSample> = None;

    // Partial selection: only the top two ranks matter
    for sample in samples {
        match first {
            Some(best) if sample.rank(&best) != Ordering::Less => match second {
                Some(runner_up) if sample.rank(&runner_up) != Ordering::Less => {}
                _ => second = Some(*sample),
            },
            _ => {
                second = first;
                first = Some(*sample);
            }
        }
    }

    let primary = first?;
    let pair = match second {
        Some(s) if s.weight > 0 => DominantPair {
            primary_id: primary.id,
            secondary_id: s.id,
            secondary_weight: s.weight,
        },
        _ => DominantPair {
            primary_id: primary.id,
            secondary_id: primary.id,
            secondary_weight: 0,
        },
    };
    Some(pair)
}
