//! Two-pass blend map bake.

use std::time::{Duration, Instant};

use bevy::prelude::*;
use bytemuck::Zeroable;
use rayon::prelude::*;

use super::axis::classify_axis;
use super::grid::BakeGrid;
use super::neighborhood::{NeighborMarks, examine_neighbors};
use super::normal::NormalMap;
use super::settings::{BakeSettings, EmptyTexelAxis};
use super::splat::{AlphaMapStack, CHANNELS_PER_LAYER, SplatSample, select_dominant_pair};
use super::texel::{ProjectionAxis, Texel0, Texel1};
use super::validation::{BakeError, validate_inputs};

/// Summary of a finished bake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BakeStats {
    pub texels: usize,
    /// Alpha layers actually read.
    pub layers: usize,
    /// Texels with no nonzero alpha weight.
    pub empty_texels: usize,
    /// Texels with a nonzero secondary weight.
    pub blended_texels: usize,
    pub bilinear_texels: usize,
    pub axis_blend_texels: usize,
    /// Texel count per projection axis, indexed X, Y, Z.
    pub axis_counts: [usize; 3],
    pub elapsed: Duration,
}

/// The two baked blend maps.
///
/// Both buffers are R×R, row-major, and indexed through the same
/// [`BakeGrid`].
#[derive(Clone, Debug)]
pub struct BlendMaps {
    grid: BakeGrid,
    map0: Vec<Texel0>,
    map1: Vec<Texel1>,
    stats: BakeStats,
}

impl BlendMaps {
    #[inline]
    pub fn grid(&self) -> BakeGrid {
        self.grid
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.grid.resolution()
    }

    #[inline]
    pub fn blend_map0(&self) -> &[Texel0] {
        &self.map0
    }

    #[inline]
    pub fn blend_map1(&self) -> &[Texel1] {
        &self.map1
    }

    #[inline]
    pub fn texel0(&self, x: u32, y: u32) -> Texel0 {
        self.map0[self.grid.index(x, y)]
    }

    #[inline]
    pub fn texel1(&self, x: u32, y: u32) -> Texel1 {
        self.map1[self.grid.index(x, y)]
    }

    #[inline]
    pub fn stats(&self) -> &BakeStats {
        &self.stats
    }

    /// Blend map 0 as tightly packed RGBA8 bytes.
    pub fn blend_map0_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.map0)
    }

    /// Blend map 1 as tightly packed RGBA32F bytes (native endian).
    pub fn blend_map1_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.map1)
    }
}

/// Bakes both blend maps from an alpha map stack and a normal map.
///
/// The first pass resolves layer ids, secondary weight and projection axis
/// per texel. The second pass starts only once the first has covered the
/// whole grid, and flags texels whose neighbors disagree on ids or axis.
///
/// Texels without any alpha weight keep ids `(0, 0)` and weight 0 and take
/// part in the second pass with those ids. Their axis follows
/// [`BakeSettings::empty_texel_axis`].
///
/// # Example
///
/// ```
/// use bevy::math::Vec3;
/// use bevy_terrain_baker::bake::{AlphaMapStack, BakeSettings, NormalMap, bake_blend_maps};
///
/// let mut alpha = AlphaMapStack::new(4);
/// alpha.push_layer_with(|x, _| if x < 2 { [255, 0, 0, 0] } else { [0, 255, 0, 0] });
/// let normals = NormalMap::filled(4, Vec3::Y);
///
/// let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();
/// assert_eq!(maps.texel0(0, 0).primary_id, 0);
/// assert_eq!(maps.texel0(3, 0).primary_id, 1);
/// assert!(maps.texel0(1, 0).needs_bilinear());
/// ```
pub fn bake_blend_maps(
    alpha_maps: &AlphaMapStack,
    normals: &NormalMap,
    settings: &BakeSettings,
) -> Result<BlendMaps, BakeError> {
    let layers = validate_inputs(alpha_maps, normals, settings)?;
    let grid = alpha_maps.grid();
    let row_len = grid.resolution() as usize;
    let start = Instant::now();

    debug!(
        "Baking {}x{} blend maps from {} alpha layers ({:?} neighborhood, {:?} id comparison)",
        row_len, row_len, layers, settings.neighborhood, settings.id_comparison
    );

    let mut map0 = vec![Texel0::zeroed(); grid.len()];
    let mut map1 = vec![Texel1::zeroed(); grid.len()];

    // Pass 1: ids, weight, axis
    let sample_capacity = layers * CHANNELS_PER_LAYER;
    let empty_texels: usize = if settings.parallel {
        map0.par_chunks_mut(row_len)
            .zip(map1.par_chunks_mut(row_len))
            .enumerate()
            .map(|(y, (row0, row1))| {
                resolve_row(y as u32, row0, row1, alpha_maps, normals, settings, sample_capacity)
            })
            .sum()
    } else {
        map0.chunks_mut(row_len)
            .zip(map1.chunks_mut(row_len))
            .enumerate()
            .map(|(y, (row0, row1))| {
                resolve_row(y as u32, row0, row1, alpha_maps, normals, settings, sample_capacity)
            })
            .sum()
    };

    // Pass 2: every mark is computed against the finished first pass before
    // any texel is patched.
    let marks: Vec<NeighborMarks> = {
        let resolved = &map0;
        let examine = |index: usize| {
            let pos = grid.coords(index);
            examine_neighbors(
                resolved,
                grid,
                pos.x,
                pos.y,
                settings.neighborhood,
                settings.id_comparison,
            )
        };
        if settings.parallel {
            (0..grid.len()).into_par_iter().map(examine).collect()
        } else {
            (0..grid.len()).map(examine).collect()
        }
    };

    if settings.parallel {
        map0.par_iter_mut()
            .zip(map1.par_iter_mut())
            .zip(marks.par_iter())
            .for_each(|((texel0, texel1), marks)| apply_marks(texel0, texel1, *marks));
    } else {
        map0.iter_mut()
            .zip(map1.iter_mut())
            .zip(marks.iter())
            .for_each(|((texel0, texel1), marks)| apply_marks(texel0, texel1, *marks));
    }

    let mut stats = collect_stats(&map0, &map1);
    stats.layers = layers;
    stats.empty_texels = empty_texels;
    stats.elapsed = start.elapsed();

    info!(
        "Baked {}x{} blend maps in {:.1?}: {} bilinear texels, {} axis blend texels, {} empty texels",
        row_len,
        row_len,
        stats.elapsed,
        stats.bilinear_texels,
        stats.axis_blend_texels,
        stats.empty_texels
    );

    Ok(BlendMaps {
        grid,
        map0,
        map1,
        stats,
    })
}

/// Resolves one row of the first pass. Returns the number of empty texels.
fn resolve_row(
    y: u32,
    row0: &mut [Texel0],
    row1: &mut [Texel1],
    alpha_maps: &AlphaMapStack,
    normals: &NormalMap,
    settings: &BakeSettings,
    sample_capacity: usize,
) -> usize {
    let grid = alpha_maps.grid();
    let mut samples: Vec<SplatSample> = Vec::with_capacity(sample_capacity);
    let mut empty = 0;

    for (x, (texel0, texel1)) in row0.iter_mut().zip(row1.iter_mut()).enumerate() {
        let index = grid.index(x as u32, y);

        samples.clear();
        alpha_maps.gather_samples(index, &mut samples);
        let normal = normals.as_slice()[index];
        *texel1 = Texel1::from_normal(normal);

        match select_dominant_pair(&samples) {
            Some(pair) => {
                texel0.primary_id = pair.primary_id;
                texel0.secondary_id = pair.secondary_id;
                texel0.secondary_weight = pair.secondary_weight;
            }
            None => {
                empty += 1;
                if settings.empty_texel_axis == EmptyTexelAxis::Unset {
                    continue;
                }
            }
        }

        texel0.set_axis(classify_axis(normal));
    }

    empty
}

#[inline]
fn apply_marks(texel0: &mut Texel0, texel1: &mut Texel1, marks: NeighborMarks) {
    if marks.bilinear {
        texel0.mark_bilinear();
    }
    texel1.axis_blend = if marks.axis_blend { 1.0 } else { 0.0 };
}

fn collect_stats(map0: &[Texel0], map1: &[Texel1]) -> BakeStats {
    let mut stats = BakeStats {
        texels: map0.len(),
        ..default()
    };
    for (texel0, texel1) in map0.iter().zip(map1) {
        stats.blended_texels += texel0.is_blended() as usize;
        stats.bilinear_texels += texel0.needs_bilinear() as usize;
        stats.axis_blend_texels += texel1.needs_axis_blend() as usize;
        let slot = match texel0.axis() {
            ProjectionAxis::X => 0,
            ProjectionAxis::Y => 1,
            ProjectionAxis::Z => 2,
        };
        stats.axis_counts[slot] += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::settings::{IdComparison, LayerOverflow, Neighborhood};
    use crate::bake::splat::MAX_ALPHA_LAYERS;

    /// 4×4, one layer, red everywhere except green at (2, 2).
    fn single_outlier() -> (AlphaMapStack, NormalMap) {
        let mut alpha = AlphaMapStack::new(4);
        alpha.push_layer_with(|x, y| {
            if (x, y) == (2, 2) {
                [0, 255, 0, 0]
            } else {
                [255, 0, 0, 0]
            }
        });
        (alpha, NormalMap::filled(4, Vec3::Y))
    }

    fn bilinear_texels(maps: &BlendMaps) -> Vec<(u32, u32)> {
        maps.grid()
            .positions()
            .filter(|p| maps.texel0(p.x, p.y).needs_bilinear())
            .map(|p| (p.x, p.y))
            .collect()
    }

    /// Pseudo-random terrain with blended layers and mixed normals.
    fn noisy_inputs(resolution: u32, layers: usize) -> (AlphaMapStack, NormalMap) {
        let hash = |x: u32, y: u32, salt: u32| {
            let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77) ^ salt;
            h ^= h >> 15;
            h = h.wrapping_mul(0x2C1B_3C6D);
            h ^= h >> 12;
            h
        };
        let mut alpha = AlphaMapStack::new(resolution);
        for layer in 0..layers as u32 {
            alpha.push_layer_with(|x, y| {
                let h = hash(x, y, layer);
                // Zero out most channels so texels carry 0-3 samples
                let channel = |shift: u32| {
                    let v = (h >> shift) as u8;
                    if v > 180 { v } else { 0 }
                };
                [channel(0), channel(8), channel(16), channel(24)]
            });
        }
        let normals = NormalMap::from_fn(resolution, |x, y| {
            let h = hash(x, y, 0xABCD);
            Vec3::new(
                (h & 0xFF) as f32 / 127.5 - 1.0,
                ((h >> 8) & 0xFF) as f32 / 127.5 - 1.0,
                ((h >> 16) & 0xFF) as f32 / 127.5 - 1.0,
            )
        });
        (alpha, normals)
    }

    #[test]
    fn test_outlier_scenario_moore() {
        let (alpha, normals) = single_outlier();
        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();

        for pos in maps.grid().positions() {
            let texel = maps.texel0(pos.x, pos.y);
            let expected_id = if (pos.x, pos.y) == (2, 2) { 1 } else { 0 };
            assert_eq!(texel.primary_id, expected_id);
            assert_eq!(texel.secondary_id, expected_id);
            assert_eq!(texel.secondary_weight, 0);
            assert_eq!(texel.axis(), ProjectionAxis::Y);
            assert!(!maps.texel1(pos.x, pos.y).needs_axis_blend());
        }

        let mut expected = Vec::new();
        for y in 1..=3 {
            for x in 1..=3 {
                expected.push((x, y));
            }
        }
        assert_eq!(bilinear_texels(&maps), expected);
    }

    #[test]
    fn test_outlier_scenario_legacy() {
        let (alpha, normals) = single_outlier();
        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::legacy()).unwrap();

        // (1, 3) would only see (2, 2) through the bottom-right offset,
        // which the legacy neighbor set never samples.
        assert_eq!(
            bilinear_texels(&maps),
            vec![
                (1, 1),
                (2, 1),
                (3, 1),
                (1, 2),
                (2, 2),
                (3, 2),
                (2, 3),
                (3, 3),
            ]
        );
    }

    #[test]
    fn test_empty_texels_default_to_zero_ids() {
        let mut alpha = AlphaMapStack::new(3);
        alpha.push_layer_with(|_, _| [0, 0, 0, 0]);
        let normals = NormalMap::filled(3, Vec3::new(0.1, 0.2, 0.95));

        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();
        for texel in maps.blend_map0() {
            assert_eq!(texel.primary_id, 0);
            assert_eq!(texel.secondary_id, 0);
            assert_eq!(texel.secondary_weight, 0);
            // Axis still comes from the normal
            assert_eq!(texel.axis(), ProjectionAxis::Z);
            assert!(!texel.needs_bilinear());
        }
        assert_eq!(maps.stats().empty_texels, 9);
        assert_eq!(maps.stats().axis_counts, [0, 0, 9]);
    }

    #[test]
    fn test_empty_texel_axis_policy() {
        let mut alpha = AlphaMapStack::new(2);
        alpha.push_layer_with(|x, y| if (x, y) == (0, 0) { [0; 4] } else { [0, 255, 0, 0] });
        let normals = NormalMap::filled(2, Vec3::X);

        let classified = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();
        assert_eq!(classified.texel0(0, 0).axis(), ProjectionAxis::X);
        assert!(!classified.texel1(0, 0).needs_axis_blend());

        let legacy = bake_blend_maps(&alpha, &normals, &BakeSettings::legacy()).unwrap();
        let empty = legacy.texel0(0, 0);
        assert_eq!(empty.flags & ProjectionAxis::MASK, 0);
        assert_eq!(empty.axis(), ProjectionAxis::Y);
        assert_eq!(legacy.texel1(0, 0).normal(), Vec3::X);
        // Unset axis differs from its X-facing neighbors
        assert!(legacy.texel1(0, 0).needs_axis_blend());
        assert!(legacy.texel1(1, 1).needs_axis_blend());
        assert_eq!(legacy.texel0(1, 1).axis(), ProjectionAxis::X);
        assert_eq!(legacy.stats().axis_counts, [3, 1, 0]);
    }

    #[test]
    fn test_empty_texel_joins_neighbor_scan() {
        let empty_corner = |id_layer: usize| {
            let mut alpha = AlphaMapStack::new(2);
            for layer in 0..2 {
                alpha.push_layer_with(|x, y| {
                    if (x, y) == (0, 0) || layer != id_layer {
                        [0; 4]
                    } else if layer == 0 {
                        [255, 0, 0, 0]
                    } else {
                        [0, 255, 0, 0]
                    }
                });
            }
            alpha
        };
        let normals = NormalMap::new(2);

        // Neighbors of primary id 5 disagree with the empty texel's zero ids
        let maps = bake_blend_maps(&empty_corner(1), &normals, &BakeSettings::default()).unwrap();
        assert_eq!(maps.texel0(1, 0).primary_id, 5);
        assert!(maps.texel0(0, 0).needs_bilinear());
        assert!(maps.texel0(1, 0).needs_bilinear());
        assert_eq!(maps.stats().empty_texels, 1);

        // Single-sample layer 0 neighbors match the zero default
        let maps = bake_blend_maps(&empty_corner(0), &normals, &BakeSettings::default()).unwrap();
        assert_eq!(maps.texel0(1, 0).primary_id, 0);
        assert!(!maps.texel0(0, 0).needs_bilinear());
        assert!(!maps.texel0(1, 0).needs_bilinear());
        assert_eq!(maps.stats().bilinear_texels, 0);
    }

    #[test]
    fn test_single_layer_has_no_secondary() {
        let mut alpha = AlphaMapStack::new(2);
        alpha.push_layer_with(|_, _| [0, 0, 0, 0]);
        alpha.push_layer_with(|x, _| [0, 0, 40 + x as u8, 0]);
        let normals = NormalMap::new(2);

        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();
        for texel in maps.blend_map0() {
            assert_eq!(texel.primary_id, 6);
            assert_eq!(texel.secondary_id, 6);
            assert_eq!(texel.secondary_weight, 0);
        }
        assert_eq!(maps.stats().blended_texels, 0);
    }

    #[test]
    fn test_two_layers_blend() {
        let mut alpha = AlphaMapStack::new(2);
        alpha.push_layer_with(|_, _| [60, 0, 0, 190]);
        let normals = NormalMap::new(2);

        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();
        let texel = maps.texel0(1, 1);
        assert_eq!(texel.primary_id, 3);
        assert_eq!(texel.secondary_id, 0);
        assert_eq!(texel.secondary_weight, 60);
        assert_eq!(maps.stats().blended_texels, 4);
    }

    #[test]
    fn test_uniform_field_is_stable() {
        let mut alpha = AlphaMapStack::new(5);
        alpha.push_layer_with(|_, _| [200, 55, 0, 0]);
        alpha.push_layer_with(|_, _| [0, 0, 30, 0]);
        let normals = NormalMap::filled(5, Vec3::new(0.9, 0.3, 0.1).normalize());

        for neighborhood in [Neighborhood::Moore, Neighborhood::Legacy] {
            let settings = BakeSettings::default().with_neighborhood(neighborhood);
            let maps = bake_blend_maps(&alpha, &normals, &settings).unwrap();
            for (texel0, texel1) in maps.blend_map0().iter().zip(maps.blend_map1()) {
                assert_eq!(texel0.flags, ProjectionAxis::FLAG_X);
                assert_eq!(texel1.axis_blend, 0.0);
            }
        }
    }

    #[test]
    fn test_legacy_id_rule_flags_uniform_blend() {
        let mut alpha = AlphaMapStack::new(3);
        alpha.push_layer_with(|_, _| [200, 55, 0, 0]);
        let normals = NormalMap::new(3);

        let settings = BakeSettings::default().with_id_comparison(IdComparison::Legacy);
        let maps = bake_blend_maps(&alpha, &normals, &settings).unwrap();
        assert_eq!(maps.stats().bilinear_texels, 9);
    }

    #[test]
    fn test_axis_blend_at_boundary() {
        let mut alpha = AlphaMapStack::new(4);
        alpha.push_layer_with(|_, _| [255, 0, 0, 0]);
        // Left half faces up, right half faces +X
        let normals = NormalMap::from_fn(4, |x, _| if x < 2 { Vec3::Y } else { Vec3::X });

        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();
        for pos in maps.grid().positions() {
            let texel0 = maps.texel0(pos.x, pos.y);
            let texel1 = maps.texel1(pos.x, pos.y);
            let expected_axis = if pos.x < 2 { ProjectionAxis::Y } else { ProjectionAxis::X };
            assert_eq!(texel0.axis(), expected_axis);
            assert!(!texel0.needs_bilinear());
            assert_eq!(texel1.needs_axis_blend(), pos.x == 1 || pos.x == 2);
        }
        assert_eq!(maps.stats().axis_blend_texels, 8);
        assert_eq!(maps.stats().axis_counts, [8, 8, 0]);
    }

    #[test]
    fn test_normals_pass_through() {
        let (alpha, _) = single_outlier();
        let normals = NormalMap::from_fn(4, |x, y| Vec3::new(x as f32 * 0.1, 1.0, y as f32 * -0.1));

        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();
        for pos in maps.grid().positions() {
            assert_eq!(maps.texel1(pos.x, pos.y).normal(), normals.get(pos.x, pos.y));
        }
    }

    #[test]
    fn test_bake_is_deterministic() {
        let (alpha, normals) = noisy_inputs(37, 3);
        let settings = BakeSettings::default();

        let first = bake_blend_maps(&alpha, &normals, &settings).unwrap();
        let second = bake_blend_maps(&alpha, &normals, &settings).unwrap();
        assert_eq!(first.blend_map0_bytes(), second.blend_map0_bytes());
        assert_eq!(first.blend_map1_bytes(), second.blend_map1_bytes());
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (alpha, normals) = noisy_inputs(29, 2);
        for base in [BakeSettings::default(), BakeSettings::legacy()] {
            let parallel =
                bake_blend_maps(&alpha, &normals, &base.clone().with_parallel(true)).unwrap();
            let serial = bake_blend_maps(&alpha, &normals, &base.with_parallel(false)).unwrap();
            assert_eq!(parallel.blend_map0(), serial.blend_map0());
            assert_eq!(parallel.blend_map1_bytes(), serial.blend_map1_bytes());
            assert_eq!(parallel.stats().empty_texels, serial.stats().empty_texels);
        }
    }

    #[test]
    fn test_second_pass_only_touches_flags() {
        let (alpha, normals) = noisy_inputs(16, 2);
        let maps = bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap();

        for (index, texel) in maps.blend_map0().iter().enumerate() {
            let pos = maps.grid().coords(index);
            let mut samples = alpha.samples_at(pos.x, pos.y);
            samples.sort_by(SplatSample::rank);
            let expected_primary = samples.first().map_or(0, |s| s.id);
            assert_eq!(texel.primary_id, expected_primary);
            assert_eq!(texel.axis(), classify_axis(normals.get(pos.x, pos.y)));
            assert_eq!(texel.flags & !0b111, 0);
        }
    }

    #[test]
    fn test_layer_overflow_boundary() {
        let normals = NormalMap::new(2);

        let mut accepted = AlphaMapStack::new(2);
        for layer in 0..MAX_ALPHA_LAYERS {
            let weight = if layer == MAX_ALPHA_LAYERS - 1 { 255 } else { 1 };
            accepted.push_layer_with(|_, _| [0, 0, 0, weight]);
        }
        let maps = bake_blend_maps(&accepted, &normals, &BakeSettings::default()).unwrap();
        assert_eq!(maps.texel0(0, 0).primary_id, 251);
        assert_eq!(maps.stats().layers, 63);

        let mut overflowing = accepted.clone();
        overflowing.push_layer_with(|_, _| [255, 255, 255, 255]);
        assert!(matches!(
            bake_blend_maps(&overflowing, &normals, &BakeSettings::default()),
            Err(BakeError::TooManyLayers { layers: 64, max: 63 })
        ));

        let truncate = BakeSettings::default().with_layer_overflow(LayerOverflow::Truncate);
        let maps = bake_blend_maps(&overflowing, &normals, &truncate).unwrap();
        assert_eq!(maps.texel0(0, 0).primary_id, 251);
        assert_eq!(maps.stats().layers, 63);
    }

    #[test]
    fn test_rejects_mismatched_normals() {
        let (alpha, _) = single_outlier();
        let normals = NormalMap::from_vec(4, vec![Vec3::Y; 15]);
        assert_eq!(
            bake_blend_maps(&alpha, &normals, &BakeSettings::default()).unwrap_err(),
            BakeError::NormalSizeMismatch {
                expected: 16,
                found: 15
            }
        );
    }

    #[test]
    fn test_single_texel_grid() {
        let mut alpha = AlphaMapStack::new(1);
        alpha.push_layer_with(|_, _| [10, 20, 0, 0]);
        let maps = bake_blend_maps(&alpha, &NormalMap::new(1), &BakeSettings::default()).unwrap();
        let texel = maps.texel0(0, 0);
        assert_eq!(texel.primary_id, 1);
        assert_eq!(texel.secondary_id, 0);
        assert!(!texel.needs_bilinear());
    }
}
