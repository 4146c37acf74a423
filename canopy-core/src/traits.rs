//! Core traits for canopy

use crate::{mesh::*, point::*, point_buffer::*, render::*, transform::Transform3D, Result};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }
}

/// Trait for objects that can be transformed
pub trait Transformable {
    /// Apply a transformation to the object
    fn transform(&mut self, transform: &Transform3D);
}

/// A drawing surface owned by the host.
///
/// The scene never creates or destroys the surface; it only reports size
/// changes and submits one draw list per frame.
pub trait RenderSurface {
    /// React to a viewport size change
    fn resize(&mut self, size: ViewportSize);

    /// Draw one frame
    fn draw(&mut self, list: &DrawList<'_>) -> Result<()>;
}

fn bounds_of<'a>(points: impl IntoIterator<Item = &'a Point3f>) -> (Point3f, Point3f) {
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return (Point3f::origin(), Point3f::origin());
    };

    iter.fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)))
}

impl Drawable for PointBuffer {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.positions())
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(&self.vertices)
    }
}

impl Transformable for TriangleMesh {
    fn transform(&mut self, transform: &Transform3D) {
        for vertex in &mut self.vertices {
            *vertex = transform.transform_point(vertex);
        }
    }
}
