//! Ground disc

use crate::unit;
use canopy_core::{Color, GroundConfig, Point3f, PointBatch, PointBuffer, PointMaterial};
use rand::Rng;
use std::f32::consts::TAU;

/// Sample `count` points uniformly over a disc of `radius` centred on the origin.
///
/// The radius is drawn as `radius * sqrt(u)` so areal density is uniform;
/// drawing it linearly would cluster points around the centre. Heights jitter
/// in `[-1, -0.5)` and every point gets a gray shade in `[0.15, 0.35)`.
pub fn ground_points<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> PointBuffer {
    let mut buffer = PointBuffer::with_capacity(count);

    for _ in 0..count {
        let r = radius * unit(rng).sqrt();
        let theta = unit(rng) * TAU;
        let y = -1.0 + unit(rng) * 0.5;
        let shade = 0.15 + unit(rng) * 0.2;

        buffer.push(
            Point3f::new(r * theta.cos(), y, r * theta.sin()),
            Color::gray(shade),
        );
    }

    buffer
}

/// Generate the ground batch
pub fn generate_ground<R: Rng + ?Sized>(config: &GroundConfig, rng: &mut R) -> PointBatch {
    let buffer = ground_points(config.points, config.radius, rng);
    log::debug!("ground: {} points over radius {}", buffer.len(), config.radius);
    PointBatch::new(buffer, PointMaterial::new(config.point_size, config.opacity))
}
