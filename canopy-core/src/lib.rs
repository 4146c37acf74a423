//! Core data structures and traits for canopy
//!
//! This crate provides the fundamental types shared by the procedural
//! generator, the renderer and the interaction layer: colours, point buffers
//! and batches, triangle meshes, rays, the scene configuration and the
//! render-surface trait.

pub mod point;
pub mod color;
pub mod point_buffer;
pub mod batch;
pub mod mesh;
pub mod ray;
pub mod transform;
pub mod render;
pub mod config;
pub mod traits;
pub mod error;

pub use point::*;
pub use color::Color;
pub use point_buffer::*;
pub use batch::*;
pub use mesh::*;
pub use ray::*;
pub use transform::*;
pub use render::*;
pub use config::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point2, Point3, UnitQuaternion, Vector2, Vector3, Vector4};
