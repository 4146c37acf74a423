//! Layered forest generation
//!
//! The forest is built in stages over a shared point buffer:
//!
//! 1. a pool of [`TreeArchetype`]s is sampled from bounded ranges,
//! 2. clusters (one per tree) are placed in an outer ring, an inner scatter
//!    and several distant layers, each stamped from a random archetype,
//! 3. trunk, branch and fill points are emitted from randomly picked clusters,
//! 4. an undergrowth layer is scattered near ground level.
//!
//! Points that would be too dark to see are dropped rather than retried, so
//! the emitted count never exceeds the configured budget.

use crate::unit;
use canopy_core::{
    radial_distance, Color, ForestConfig, Point3f, PointBatch, PointBuffer, PointMaterial,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Distance at which the distance fade reaches its floor
const FADE_DISTANCE: f32 = 250.0;
/// Inner radius of the undergrowth band
const FLOOR_INNER_RADIUS: f32 = 20.0;

/// Shape parameters shared by a family of trees
#[derive(Debug, Clone, PartialEq)]
pub struct TreeArchetype {
    pub branch_density: f32,
    pub branch_length: f32,
    pub branch_droop: f32,
    pub branch_spacing: f32,
    pub trunk_width: f32,
    pub branch_variation: f32,
}

impl TreeArchetype {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            branch_density: 0.6 + unit(rng) * 0.4,
            branch_length: 15.0 + unit(rng) * 30.0,
            branch_droop: 1.0 + unit(rng) * 3.0,
            branch_spacing: unit(rng) * 0.5,
            trunk_width: 2.0 + unit(rng) * 3.0,
            branch_variation: 0.5 + unit(rng) * 1.5,
        }
    }
}

/// Background layer a cluster belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceTier {
    pub layer: usize,
    /// Brightness multiplier, decreasing with `layer`
    pub darkness: f32,
}

/// One tree of the forest
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterLayout {
    pub x: f32,
    pub z: f32,
    pub trunk_height: f32,
    pub trunk_width: f32,
    pub branch_count: u32,
    pub branch_density: f32,
    pub branch_length_factor: f32,
    pub branch_droop_factor: f32,
    pub branch_spacing_factor: f32,
    pub branch_variation: f32,
    pub vertical_skew: f32,
    pub dense_bottom: bool,
    pub sparse_top: bool,
    pub thin_trunk: bool,
    pub tier: Option<DistanceTier>,
}

impl ClusterLayout {
    pub fn is_distant(&self) -> bool {
        self.tier.is_some()
    }

    /// Brightness multiplier of the cluster's distance tier, 1 for near trees
    pub fn darkness(&self) -> f32 {
        self.tier.map_or(1.0, |t| t.darkness)
    }

    /// A cluster in the outer ring around the clearing
    fn outer<R: Rng + ?Sized>(archetype: &TreeArchetype, x: f32, z: f32, rng: &mut R) -> Self {
        Self {
            x,
            z,
            trunk_height: 180.0 + unit(rng) * 220.0,
            trunk_width: archetype.trunk_width * (0.8 + unit(rng) * 0.4),
            branch_count: 30 + rng.gen_range(0..40),
            branch_density: archetype.branch_density * (0.8 + unit(rng) * 0.4),
            branch_length_factor: archetype.branch_length * (0.7 + unit(rng) * 0.6),
            branch_droop_factor: archetype.branch_droop * (0.7 + unit(rng) * 0.6),
            branch_spacing_factor: archetype.branch_spacing * (0.7 + unit(rng) * 0.6),
            branch_variation: archetype.branch_variation * (0.7 + unit(rng) * 0.6),
            vertical_skew: unit(rng) * 0.2 - 0.1,
            dense_bottom: unit(rng) > 0.7,
            sparse_top: unit(rng) > 0.4,
            thin_trunk: unit(rng) > 0.7,
            tier: None,
        }
    }

    /// An inner cluster, with wider rescaling than the ring
    fn inner<R: Rng + ?Sized>(archetype: &TreeArchetype, x: f32, z: f32, rng: &mut R) -> Self {
        Self {
            x,
            z,
            trunk_height: 160.0 + unit(rng) * 240.0,
            trunk_width: archetype.trunk_width * (0.7 + unit(rng) * 0.6),
            branch_count: 25 + rng.gen_range(0..45),
            branch_density: archetype.branch_density * (0.6 + unit(rng) * 0.8),
            branch_length_factor: archetype.branch_length * (0.6 + unit(rng) * 0.8),
            branch_droop_factor: archetype.branch_droop * (0.5 + unit(rng)),
            branch_spacing_factor: archetype.branch_spacing * (0.5 + unit(rng)),
            branch_variation: archetype.branch_variation * (0.5 + unit(rng)),
            vertical_skew: unit(rng) * 0.3 - 0.15,
            dense_bottom: unit(rng) > 0.5,
            sparse_top: unit(rng) > 0.3,
            thin_trunk: unit(rng) > 0.6,
            tier: None,
        }
    }

    /// A simplified background tree. Distant clusters do not use archetypes.
    fn distant<R: Rng + ?Sized>(tier: DistanceTier, x: f32, z: f32, rng: &mut R) -> Self {
        Self {
            x,
            z,
            trunk_height: 180.0 + unit(rng) * 220.0,
            trunk_width: 2.0 + unit(rng) * 3.0,
            branch_count: 20 + rng.gen_range(0..30),
            branch_density: 0.6 + unit(rng) * 0.4,
            branch_length_factor: 15.0 + unit(rng) * 20.0,
            branch_droop_factor: 1.0 + unit(rng) * 2.0,
            branch_spacing_factor: unit(rng) * 0.5,
            branch_variation: 0.7 + unit(rng) * 1.2,
            vertical_skew: unit(rng) * 0.2 - 0.1,
            dense_bottom: unit(rng) > 0.6,
            sparse_top: unit(rng) > 0.4,
            thin_trunk: unit(rng) > 0.6,
            tier: Some(tier),
        }
    }
}

/// Sample the archetype pool
pub fn generate_archetypes<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<TreeArchetype> {
    (0..count).map(|_| TreeArchetype::sample(rng)).collect()
}

/// Distance tier of background layer `layer`, with its nominal radius
pub fn distance_tier(config: &ForestConfig, layer: usize) -> (DistanceTier, f32) {
    let layers = config.distant_layers.max(1) as f32;
    let span = config.max_distant_radius - config.radius - 50.0;
    let radius = config.radius + 50.0 + layer as f32 * span / layers;
    let darkness = 1.0 - (layer as f32 / layers) * 0.95;
    (DistanceTier { layer, darkness }, radius)
}

/// Place every cluster of the forest.
///
/// Ring and inner clusters need at least one archetype; with an empty pool
/// only the distant layers are placed.
pub fn place_clusters<R: Rng + ?Sized>(
    config: &ForestConfig,
    archetypes: &[TreeArchetype],
    rng: &mut R,
) -> Vec<ClusterLayout> {
    let radius = config.radius;
    let mut clusters = Vec::with_capacity(
        config.outer_clusters + config.inner_clusters + config.distant_layers * config.clusters_per_layer,
    );

    // Outer ring: even spacing with angular and radial jitter
    for i in 0..config.outer_clusters {
        let angle = i as f32 / config.outer_clusters as f32 * TAU + (unit(rng) * 0.6 - 0.3);
        let dist = radius + (unit(rng) * 40.0 - 20.0);
        if let Some(archetype) = archetypes.choose(rng) {
            clusters.push(ClusterLayout::outer(archetype, dist * angle.cos(), dist * angle.sin(), rng));
        }
    }

    for _ in 0..config.inner_clusters {
        let angle = unit(rng) * TAU;
        let dist = radius * (0.5 + unit(rng) * 0.4) + (unit(rng) * 40.0 - 20.0);
        if let Some(archetype) = archetypes.choose(rng) {
            clusters.push(ClusterLayout::inner(archetype, dist * angle.cos(), dist * angle.sin(), rng));
        }
    }

    for layer in 0..config.distant_layers {
        let (tier, layer_radius) = distance_tier(config, layer);
        for _ in 0..config.clusters_per_layer {
            let angle = unit(rng) * TAU;
            let dist = layer_radius + (unit(rng) * 40.0 - 20.0);
            clusters.push(ClusterLayout::distant(tier, dist * angle.cos(), dist * angle.sin(), rng));
        }
    }

    clusters
}

/// Per-stage point counts of one forest generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForestStats {
    pub archetypes: usize,
    pub clusters: usize,
    pub trunk_points: usize,
    pub branch_points: usize,
    pub fill_points: usize,
    pub floor_points: usize,
    /// Samples discarded for being too dark or below ground
    pub dropped: usize,
}

impl ForestStats {
    /// Total number of emitted points
    pub fn emitted(&self) -> usize {
        self.trunk_points + self.branch_points + self.fill_points + self.floor_points
    }
}

/// Sample counts of each stage, derived from the point budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudget {
    pub floor: usize,
    pub trunk: usize,
    pub branch: usize,
    pub fill: usize,
}

impl StageBudget {
    /// The floor layer is taken from the budget first; the remainder is split
    /// 20/70/10 between trunks, branches and fill.
    pub fn split(point_budget: usize, floor_points: usize) -> Self {
        let floor = floor_points.min(point_budget);
        let remainder = point_budget - floor;
        Self {
            floor,
            trunk: remainder * 2 / 10,
            branch: remainder * 7 / 10,
            fill: remainder / 10,
        }
    }

    pub fn total(&self) -> usize {
        self.floor + self.trunk + self.branch + self.fill
    }
}

/// A generated forest batch with its statistics
#[derive(Debug, Clone)]
pub struct Forest {
    pub batch: PointBatch,
    pub stats: ForestStats,
}

struct Emitter<'a> {
    buffer: PointBuffer,
    threshold: f32,
    stats: &'a mut ForestStats,
}

impl Emitter<'_> {
    /// Push a gray point if it is bright enough. Returns whether it was kept.
    fn emit(&mut self, position: Point3f, gray: f32) -> bool {
        if gray > self.threshold && self.buffer.push(position, Color::gray(gray)) {
            true
        } else {
            self.stats.dropped += 1;
            false
        }
    }
}

fn distance_fade(position: &Point3f, floor: f32) -> f32 {
    (1.0 - radial_distance(position) / FADE_DISTANCE).max(floor)
}

fn emit_trunks<R: Rng + ?Sized>(
    clusters: &[ClusterLayout],
    samples: usize,
    emitter: &mut Emitter<'_>,
    rng: &mut R,
) -> usize {
    let mut kept = 0;
    for _ in 0..samples {
        let Some(cluster) = clusters.choose(rng) else {
            break;
        };

        let height_percent = unit(rng);
        let skew = cluster.vertical_skew * height_percent * 20.0;

        // Tapered cylinder, thinner toward the top
        let thin = if cluster.thin_trunk { 0.6 } else { 1.0 };
        let thickness = cluster.trunk_width * thin * (1.0 - height_percent * 0.6);
        let r = thickness * unit(rng).powf(0.7) * 0.5;
        let theta = unit(rng) * TAU;

        let position = Point3f::new(
            cluster.x + skew + r * theta.cos(),
            height_percent * cluster.trunk_height,
            cluster.z + r * theta.sin(),
        );

        let shade = 0.08 + unit(rng) * 0.07;
        let gray = shade * distance_fade(&position, 0.3) * cluster.darkness();
        if emitter.emit(position, gray) {
            kept += 1;
        }
    }
    kept
}

/// Height ratio of a branch point, biased by the cluster's shape flags
fn branch_height_ratio<R: Rng + ?Sized>(cluster: &ClusterLayout, rng: &mut R) -> f32 {
    if cluster.dense_bottom && unit(rng) < 0.7 {
        unit(rng).powf(1.5) * 0.6
    } else if cluster.sparse_top && unit(rng) < 0.7 {
        unit(rng) * 0.8
    } else {
        let exponent = 0.7 + unit(rng) * 0.6;
        unit(rng).powf(exponent)
    }
}

fn emit_branches<R: Rng + ?Sized>(
    clusters: &[ClusterLayout],
    samples: usize,
    max_height: f32,
    emitter: &mut Emitter<'_>,
    rng: &mut R,
) -> usize {
    let mut kept = 0;
    for _ in 0..samples {
        let Some(cluster) = clusters.choose(rng) else {
            break;
        };

        let h = branch_height_ratio(cluster, rng);
        let start_height = h * cluster.trunk_height * 0.95;

        // Smooth sinusoid of height plus jitter, not true noise
        let pattern = (h * 20.0).sin() * (h * 15.0).cos() * 0.5 + 0.5;
        let angle = pattern * TAU + unit(rng) * cluster.branch_variation;

        let max_length = cluster.branch_length_factor * (0.5 + unit(rng));
        let length = max_length * (1.0 - h.powf(0.4 + unit(rng) * 0.8));

        // Lower branches droop, upper ones are closer to horizontal
        let vertical_angle = if h < 0.3 {
            -PI / 6.0 - unit(rng) * PI / 4.0
        } else if h > 0.8 {
            -PI / 20.0 + unit(rng) * PI / 4.0
        } else {
            -PI / 6.0 + unit(rng) * PI / 3.0
        };

        let t = unit(rng).powf(0.5 + unit(rng) * 1.5);
        let droop_factor = cluster.branch_droop_factor * (0.5 + unit(rng));
        let droop = t * t * droop_factor * (0.5 + unit(rng) * 1.5);
        let skew = cluster.vertical_skew * h * 20.0;

        let mut position = Point3f::new(
            cluster.x + skew + t * length * angle.cos(),
            start_height + t * length * vertical_angle.sin() - droop,
            cluster.z + t * length * angle.sin(),
        );

        // Needle scatter past the inner third of near branches
        if !cluster.is_distant() && t > 0.3 {
            let needle = (0.3 + t * 2.0) * (0.5 + unit(rng) * 1.5);
            position.x += (unit(rng) - 0.5) * needle * (1.0 + unit(rng));
            position.y += (unit(rng) - 0.5) * needle * (1.0 + unit(rng) * 0.5);
            position.z += (unit(rng) - 0.5) * needle * (1.0 + unit(rng));
        }

        if position.y < 0.0 {
            emitter.stats.dropped += 1;
            continue;
        }

        let fade = distance_fade(&position, 0.3);
        let height_fade = 1.0 - (position.y / max_height).powf(1.5 + unit(rng) * 0.5);
        let base = if t > 0.7 {
            0.2 + unit(rng) * 0.25
        } else if t > 0.3 {
            0.15 + unit(rng) * 0.2
        } else {
            0.1 + unit(rng) * 0.15
        };
        let gray = base * fade * height_fade * cluster.darkness() * (0.7 + unit(rng) * 0.6);

        if emitter.emit(position, gray) {
            kept += 1;
        }
    }
    kept
}

fn emit_fill<R: Rng + ?Sized>(
    config: &ForestConfig,
    samples: usize,
    emitter: &mut Emitter<'_>,
    rng: &mut R,
) -> usize {
    let mut kept = 0;
    for _ in 0..samples {
        let angle = unit(rng) * TAU;
        let r = config.radius + unit(rng) * config.max_distant_radius * 0.6;
        let y = unit(rng) * config.max_height;
        let position = Point3f::new(r * angle.cos(), y, r * angle.sin());

        let fade = distance_fade(&position, 0.3);
        let height_fade = 1.0 - (y / config.max_height).powf(1.2 + unit(rng));
        let depth = (1.0 - radial_distance(&position) / config.max_distant_radius).max(0.05);
        let gray = (0.08 + unit(rng) * 0.12) * fade * height_fade * depth;

        if emitter.emit(position, gray) {
            kept += 1;
        }
    }
    kept
}

fn emit_floor<R: Rng + ?Sized>(
    config: &ForestConfig,
    samples: usize,
    emitter: &mut Emitter<'_>,
    rng: &mut R,
) -> usize {
    let outer = config.radius + config.thickness;
    let mut kept = 0;
    for _ in 0..samples {
        let angle = unit(rng) * TAU;
        let r = FLOOR_INNER_RADIUS + unit(rng) * (outer - FLOOR_INNER_RADIUS);
        let y = unit(rng) * 5.0 - 1.0;
        let position = Point3f::new(r * angle.cos(), y, r * angle.sin());

        let gray = (0.1 + unit(rng) * 0.15) * distance_fade(&position, 0.2);
        if emitter.emit(position, gray) {
            kept += 1;
        }
    }
    kept
}

/// Generate the forest around the clearing.
///
/// # Arguments
/// * `config` - Forest layout, point budget and material
/// * `rng` - Random source; the same seed yields the same forest
///
/// # Returns
/// * `Forest` - One batch holding every stage, never more points than `config.point_budget`
pub fn generate_forest<R: Rng + ?Sized>(config: &ForestConfig, rng: &mut R) -> Forest {
    let archetypes = generate_archetypes(config.archetypes, rng);
    let clusters = place_clusters(config, &archetypes, rng);
    let budget = StageBudget::split(config.point_budget, config.floor_points);

    let mut stats = ForestStats {
        archetypes: archetypes.len(),
        clusters: clusters.len(),
        ..ForestStats::default()
    };

    let buffer = {
        let mut emitter = Emitter {
            buffer: PointBuffer::with_capacity(budget.total()),
            threshold: config.visibility_threshold,
            stats: &mut stats,
        };

        let trunk = emit_trunks(&clusters, budget.trunk, &mut emitter, rng);
        let branch = emit_branches(&clusters, budget.branch, config.max_height, &mut emitter, rng);
        let fill = emit_fill(config, budget.fill, &mut emitter, rng);
        let floor = emit_floor(config, budget.floor, &mut emitter, rng);

        emitter.stats.trunk_points = trunk;
        emitter.stats.branch_points = branch;
        emitter.stats.fill_points = fill;
        emitter.stats.floor_points = floor;
        emitter.buffer
    };

    log::debug!(
        "forest stages: trunk {} branch {} fill {} floor {} (dropped {})",
        stats.trunk_points,
        stats.branch_points,
        stats.fill_points,
        stats.floor_points,
        stats.dropped
    );
    log::info!(
        "forest: {} points from {} clusters (budget {})",
        buffer.len(),
        stats.clusters,
        config.point_budget
    );

    Forest {
        batch: PointBatch::new(buffer, PointMaterial::new(config.point_size, config.opacity)),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_config() -> ForestConfig {
        ForestConfig {
            point_budget: 20_000,
            floor_points: 2_000,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_stage_budget_split() {
        let budget = StageBudget::split(400_000, 25_000);
        assert_eq!(budget.floor, 25_000);
        assert_eq!(budget.trunk, 75_000);
        assert_eq!(budget.branch, 262_500);
        assert_eq!(budget.fill, 37_500);
        assert!(budget.total() <= 400_000);

        let tiny = StageBudget::split(100, 25_000);
        assert_eq!(tiny.floor, 100);
        assert_eq!(tiny.total(), 100);
    }

    #[test]
    fn test_distance_tiers_darken_outward() {
        let config = ForestConfig::default();
        let tiers: Vec<(DistanceTier, f32)> =
            (0..config.distant_layers).map(|k| distance_tier(&config, k)).collect();

        assert_eq!(tiers[0].0.darkness, 1.0);
        assert_eq!(tiers[0].1, 230.0);
        for pair in tiers.windows(2) {
            assert!(pair[1].0.darkness < pair[0].0.darkness);
            assert!(pair[1].1 > pair[0].1);
        }
    }

    #[test]
    fn test_cluster_counts() {
        let config = ForestConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let archetypes = generate_archetypes(config.archetypes, &mut rng);
        let clusters = place_clusters(&config, &archetypes, &mut rng);

        assert_eq!(archetypes.len(), 12);
        assert_eq!(clusters.len(), 130 + 70 + 5 * 150);
        assert_eq!(clusters.iter().filter(|c| c.is_distant()).count(), 750);
    }

    #[test]
    fn test_archetype_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for archetype in generate_archetypes(50, &mut rng) {
            assert!((0.6..=1.0).contains(&archetype.branch_density));
            assert!((15.0..=45.0).contains(&archetype.branch_length));
            assert!((2.0..=5.0).contains(&archetype.trunk_width));
        }
    }

    #[test]
    fn test_empty_archetype_pool_places_only_distant_layers() {
        let config = ForestConfig::default();
        let clusters = place_clusters(&config, &[], &mut StdRng::seed_from_u64(2));
        assert!(clusters.iter().all(ClusterLayout::is_distant));
    }

    #[test]
    fn test_forest_respects_threshold_and_range() {
        let config = small_config();
        let forest = generate_forest(&config, &mut StdRng::seed_from_u64(42));
        let buffer = forest.batch.buffer();

        assert!(buffer.len() <= config.point_budget);
        assert_eq!(buffer.len(), forest.stats.emitted());
        for (_, color) in buffer.iter() {
            assert!(color.is_normalized());
            assert!(color.luminance() > config.visibility_threshold - 1e-6);
        }
    }

    #[test]
    fn test_forest_is_reproducible() {
        let config = small_config();
        let a = generate_forest(&config, &mut StdRng::seed_from_u64(8));
        let b = generate_forest(&config, &mut StdRng::seed_from_u64(8));
        assert_eq!(a.batch.buffer(), b.batch.buffer());
        assert_eq!(a.stats, b.stats);
    }
}
