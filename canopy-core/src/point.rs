//! Point types and related functionality

use nalgebra::{Point2, Point3, Vector2, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 2D point, used for pointer and normalized device coordinates
pub type Point2f = Point2<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 2D vector with floating point components
pub type Vector2f = Vector2<f32>;

/// World up axis. The scene is Y-up.
pub fn world_up() -> Vector3f {
    Vector3f::y()
}

/// Distance of a point from the vertical axis through the origin
#[inline]
pub fn radial_distance(point: &Point3f) -> f32 {
    (point.x * point.x + point.z * point.z).sqrt()
}

/// Whether all coordinates of a point are finite
#[inline]
pub fn is_finite_point(point: &Point3f) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_radial_distance_ignores_height() {
        let p = Point3f::new(3.0, 100.0, 4.0);
        assert_relative_eq!(radial_distance(&p), 5.0);
    }

    #[test]
    fn test_is_finite_point() {
        assert!(is_finite_point(&Point3f::new(1.0, -2.0, 3.0)));
        assert!(!is_finite_point(&Point3f::new(f32::NAN, 0.0, 0.0)));
        assert!(!is_finite_point(&Point3f::new(0.0, f32::INFINITY, 0.0)));
    }
}
