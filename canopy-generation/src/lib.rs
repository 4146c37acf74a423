//! # Canopy Generation
//!
//! Procedural point-cloud generators for the forest scene.
//!
//! This crate synthesizes every static point batch of the scene: the ground
//! disc, the layered forest around it, and the centerpiece tree, either from
//! a loaded model or from a procedural trunk-and-canopy fallback. Every
//! generator takes an explicit random source so output is reproducible from
//! a seed.

pub mod ground;
pub mod forest;
pub mod primitives;
pub mod fallback;
pub mod tree;

// Re-export commonly used items
pub use ground::*;
pub use forest::*;
pub use primitives::*;
pub use fallback::*;
pub use tree::*;

use rand::Rng;

/// Uniform sample in `[0, 1)`
#[inline]
pub(crate) fn unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}
