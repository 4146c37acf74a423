//! Centerpiece tree
//!
//! The tree is built from the loaded model when it has geometry, otherwise
//! from the procedural fallback. Either way the result is one point batch,
//! so the hotspot layer and the frame loop never see which path was taken.

use crate::fallback::{fallback_tree, TRUNK_COLOR};
use crate::unit;
use canopy_core::{
    radial_distance, Color, Model, Point3f, PointBatch, PointBuffer, PointMaterial, TreeConfig,
    TriangleMesh,
};
use rand::Rng;
use std::fmt;

/// Leaf green of model points
pub const LEAF_COLOR: u32 = 0x228B22;

/// Part of the tree a model point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreePart {
    Trunk,
    Leaf,
}

/// Height and axis-distance rule that colours model points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeColoring {
    pub trunk_height: f32,
    pub max_height: f32,
    pub axis_radius: f32,
    pub trunk: Color,
    pub leaf: Color,
}

impl TreeColoring {
    pub fn from_config(config: &TreeConfig) -> Self {
        Self {
            trunk_height: config.trunk_height,
            max_height: config.max_height,
            axis_radius: config.axis_radius,
            trunk: Color::from_hex(TRUNK_COLOR),
            leaf: Color::from_hex(LEAF_COLOR),
        }
    }

    /// Low points, and points near the axis below 70% of the tree height, are trunk
    pub fn classify(&self, p: &Point3f) -> TreePart {
        let near_axis = radial_distance(p) < self.axis_radius && p.y < self.max_height * 0.7;
        if p.y < self.trunk_height || near_axis {
            TreePart::Trunk
        } else {
            TreePart::Leaf
        }
    }

    /// Colour a point: a random brightness around its part's base colour,
    /// with a darker bark or lighter leaf sub-shade some of the time
    pub fn color<R: Rng + ?Sized>(&self, p: &Point3f, rng: &mut R) -> Color {
        match self.classify(p) {
            TreePart::Trunk => {
                let v = 0.7 + unit(rng) * 0.3;
                if unit(rng) > 0.6 {
                    self.trunk.tinted(v * 0.8, v * 0.7, v * 0.5)
                } else {
                    self.trunk.scaled(v)
                }
            }
            TreePart::Leaf => {
                let v = 0.8 + unit(rng) * 0.4;
                if unit(rng) > 0.7 {
                    self.leaf.tinted(v * 1.2, v * 1.1, v * 0.8)
                } else {
                    self.leaf.scaled(v)
                }
            }
        }
    }
}

/// One coloured point per vertex of `mesh`
pub fn model_points<R: Rng + ?Sized>(
    mesh: &TriangleMesh,
    coloring: &TreeColoring,
    rng: &mut R,
) -> PointBuffer {
    let mut buffer = PointBuffer::with_capacity(mesh.vertex_count());
    for vertex in &mesh.vertices {
        let color = coloring.color(vertex, rng);
        buffer.push(*vertex, color);
    }
    buffer
}

/// Densify a point buffer without surface topology: each new point jitters
/// up to `offset / 2` per axis around a random existing point, and is
/// recoloured by `coloring`. Returns the number of points added.
pub fn add_density_points<R: Rng + ?Sized>(
    buffer: &mut PointBuffer,
    coloring: &TreeColoring,
    count: usize,
    offset: f32,
    rng: &mut R,
) -> usize {
    if buffer.is_empty() {
        return 0;
    }

    buffer.reserve(count);
    let mut added = 0;
    for _ in 0..count {
        let index = rng.gen_range(0..buffer.len());
        let Some(reference) = buffer.position(index).copied() else {
            continue;
        };
        let p = Point3f::new(
            reference.x + (unit(rng) - 0.5) * offset,
            reference.y + (unit(rng) - 0.5) * offset,
            reference.z + (unit(rng) - 0.5) * offset,
        );
        let color = coloring.color(&p, rng);
        if buffer.push(p, color) {
            added += 1;
        }
    }
    added
}

/// Why the fallback tree was built instead of the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    LoadFailed(String),
    NoMeshes,
    EmptyMesh,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::LoadFailed(e) => write!(f, "model failed to load: {}", e),
            FallbackReason::NoMeshes => write!(f, "model has no sub-meshes"),
            FallbackReason::EmptyMesh => write!(f, "first sub-mesh has no vertices"),
        }
    }
}

/// Which geometry the centerpiece was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CenterpieceSource {
    Model { vertices: usize, filler: usize },
    Fallback(FallbackReason),
}

impl CenterpieceSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, CenterpieceSource::Fallback(_))
    }
}

/// The centerpiece tree batch
#[derive(Debug, Clone)]
pub struct Centerpiece {
    pub batch: PointBatch,
    pub source: CenterpieceSource,
}

/// Build the centerpiece tree from the result of the model load.
///
/// Load failures, models without sub-meshes, and an empty first sub-mesh
/// all fall back to the procedural tree. None of them is an error.
pub fn build_centerpiece<R: Rng + ?Sized>(
    loaded: canopy_core::Result<Model>,
    config: &TreeConfig,
    rng: &mut R,
) -> Centerpiece {
    let mesh = match &loaded {
        Ok(model) if model.is_degenerate() => Err(if model.mesh_count() == 0 {
            FallbackReason::NoMeshes
        } else {
            FallbackReason::EmptyMesh
        }),
        Ok(model) => model.primary().ok_or(FallbackReason::NoMeshes),
        Err(e) => Err(FallbackReason::LoadFailed(e.to_string())),
    };

    match mesh {
        Ok(mesh) => {
            let coloring = TreeColoring::from_config(config);
            let mut buffer = model_points(mesh, &coloring, rng);
            let vertices = buffer.len();
            let filler = add_density_points(
                &mut buffer,
                &coloring,
                config.filler_points,
                config.filler_offset,
                rng,
            );
            log::info!("tree built from model: {} vertices, {} filler points", vertices, filler);

            Centerpiece {
                batch: PointBatch::new(buffer, PointMaterial::opaque(config.model_point_size)),
                source: CenterpieceSource::Model { vertices, filler },
            }
        }
        Err(reason) => {
            log::warn!("using fallback tree: {}", reason);
            let buffer = fallback_tree(config, rng);
            Centerpiece {
                batch: PointBatch::new(buffer, PointMaterial::opaque(config.fallback_point_size)),
                source: CenterpieceSource::Fallback(reason),
            }
        }
    }
}
