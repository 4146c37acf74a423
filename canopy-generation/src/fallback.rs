//! Procedural fallback tree
//!
//! Used when the tree model cannot be loaded or contains no geometry: a
//! tapered trunk cylinder under a canopy cone, both converted to points.

use crate::primitives::{cone, cylinder};
use crate::unit;
use canopy_core::{
    Color, Drawable, Point3f, PointBuffer, Transform3D, Transformable, TreeConfig, TriangleMesh,
    Vector3f,
};
use rand::Rng;

/// Trunk brown, shared with the model colouring rule
pub const TRUNK_COLOR: u32 = 0x8B4513;

const RADIAL_SEGMENTS: usize = 8;

/// Multiply each channel by its own factor in `[1 - variation / 2, 1 + variation / 2)`
pub fn vary_color<R: Rng + ?Sized>(base: Color, variation: f32, rng: &mut R) -> Color {
    let mut factor = || 1.0 - variation / 2.0 + unit(rng) * variation;
    base.tinted(factor(), factor(), factor())
}

/// Append every vertex of `mesh` plus `interior_samples` uniform samples
/// inside its bounding box, all coloured around `base`.
pub fn mesh_to_points<R: Rng + ?Sized>(
    mesh: &TriangleMesh,
    base: Color,
    variation: f32,
    interior_samples: usize,
    buffer: &mut PointBuffer,
    rng: &mut R,
) {
    buffer.reserve(mesh.vertex_count() + interior_samples);

    for vertex in &mesh.vertices {
        let color = vary_color(base, variation, rng);
        buffer.push(*vertex, color);
    }

    if mesh.is_empty() {
        return;
    }
    let (min, max) = mesh.bounding_box();
    let extent = max - min;
    for _ in 0..interior_samples {
        let p = Point3f::new(
            min.x + unit(rng) * extent.x,
            min.y + unit(rng) * extent.y,
            min.z + unit(rng) * extent.z,
        );
        let color = vary_color(base, variation, rng);
        buffer.push(p, color);
    }
}

/// The trunk and canopy meshes, already placed in tree space
pub fn fallback_meshes(config: &TreeConfig) -> (TriangleMesh, TriangleMesh) {
    let h = config.height;
    let r = config.radius_base;
    let levels = config.branch_levels as usize;

    let mut trunk = cylinder(r / 3.0, r / 2.0, h / 3.0, RADIAL_SEGMENTS, levels).with_name("trunk");
    trunk.transform(&Transform3D::translation(Vector3f::new(0.0, h / 6.0, 0.0)));

    let mut canopy = cone(r * 2.0, h * 2.0 / 3.0, RADIAL_SEGMENTS, levels).with_name("canopy");
    canopy.transform(&Transform3D::translation(Vector3f::new(0.0, h / 2.0 + h / 6.0, 0.0)));

    (trunk, canopy)
}

/// Build the fallback tree as one point buffer holding brown trunk points
/// and canopy points in the configured base colour.
pub fn fallback_tree<R: Rng + ?Sized>(config: &TreeConfig, rng: &mut R) -> PointBuffer {
    let (trunk, canopy) = fallback_meshes(config);
    let interior = config.points_per_level as usize / 2;
    let mut buffer = PointBuffer::new();

    mesh_to_points(
        &trunk,
        Color::from_hex(TRUNK_COLOR),
        config.color_variation,
        interior,
        &mut buffer,
        rng,
    );
    mesh_to_points(
        &canopy,
        config.base_color,
        config.color_variation,
        interior,
        &mut buffer,
        rng,
    );

    log::info!("fallback tree created with {} points", buffer.len());
    buffer
}
