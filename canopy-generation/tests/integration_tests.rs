//! Integration tests for canopy-generation
//!
//! These run the generators at their default sizes and check the properties
//! the rest of the scene relies on: budgets, colour ranges, visibility and
//! density.

use canopy_core::{radial_distance, Error, ForestConfig, GroundConfig, Model, TreeConfig};
use canopy_generation::*;
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_forest_default_budget() {
    let config = ForestConfig::default();
    assert_eq!(config.point_budget, 400_000);

    let forest = generate_forest(&config, &mut StdRng::seed_from_u64(2024));
    let buffer = forest.batch.buffer();

    assert_eq!(buffer.positions().len(), buffer.colors().len());
    assert!(buffer.len() <= 400_000);
    assert!(buffer.len() > 100_000, "only {} points emitted", buffer.len());
    assert_eq!(forest.stats.clusters, 950);
}

#[test]
fn test_forest_points_are_visible() {
    let config = ForestConfig {
        point_budget: 60_000,
        ..ForestConfig::default()
    };
    let forest = generate_forest(&config, &mut StdRng::seed_from_u64(17));

    for (position, color) in forest.batch.buffer().iter() {
        assert!(color.is_normalized());
        assert!(color.luminance() > config.visibility_threshold - 1e-6);
        assert!(position.y >= -1.0);
    }
}

#[test]
fn test_raised_threshold_drops_more() {
    let base = ForestConfig {
        point_budget: 40_000,
        ..ForestConfig::default()
    };
    let strict = ForestConfig {
        visibility_threshold: 0.1,
        ..base.clone()
    };

    let loose = generate_forest(&base, &mut StdRng::seed_from_u64(3));
    let tight = generate_forest(&strict, &mut StdRng::seed_from_u64(3));

    assert!(tight.batch.len() < loose.batch.len());
    for (_, color) in tight.batch.buffer().iter() {
        assert!(color.luminance() > 0.1 - 1e-6);
    }
}

#[test]
fn test_ground_radial_density_is_uniform() {
    let config = GroundConfig::default();
    let batch = generate_ground(&config, &mut StdRng::seed_from_u64(99));
    let n = batch.len() as f32;

    // Equal-area annuli: ring k spans radius R*sqrt(k/B)..R*sqrt((k+1)/B)
    const BINS: usize = 10;
    let mut counts = [0usize; BINS];
    for position in batch.buffer().positions() {
        let fraction = (radial_distance(position) / config.radius).powi(2);
        let bin = ((fraction * BINS as f32) as usize).min(BINS - 1);
        counts[bin] += 1;
    }

    let expected = n / BINS as f32;
    for (bin, &count) in counts.iter().enumerate() {
        let deviation = (count as f32 - expected).abs() / expected;
        assert!(deviation < 0.15, "bin {} has {} points, expected about {}", bin, count, expected);
    }
}

#[test]
fn test_fallback_after_load_failure() {
    let config = TreeConfig::default();
    let failure = Err(Error::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "models/tree.obj",
    )));

    let tree = build_centerpiece(failure, &config, &mut StdRng::seed_from_u64(5));
    assert!(tree.source.is_fallback());
    assert!(!tree.batch.is_empty());

    let colors = tree.batch.buffer().colors();
    let brown = colors.iter().filter(|c| c.r > c.g && c.g > c.b).count();
    let green = colors.iter().filter(|c| c.g > c.r && c.g > c.b).count();
    assert!(brown > 0, "no brown trunk points");
    assert!(green > 0, "no green canopy points");
    assert_eq!(brown + green, colors.len());
}

#[test]
fn test_empty_model_uses_fallback() {
    let tree = build_centerpiece(
        Ok(Model::default()),
        &TreeConfig::default(),
        &mut StdRng::seed_from_u64(5),
    );
    assert_eq!(tree.source, CenterpieceSource::Fallback(FallbackReason::NoMeshes));
}
