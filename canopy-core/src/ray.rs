//! Rays for pointer picking

use crate::point::*;

/// A half-line with a unit-length direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3f,
    pub direction: Vector3f,
}

impl Ray {
    /// Create a ray, normalizing `direction`. Returns `None` for a zero or non-finite direction.
    pub fn new(origin: Point3f, direction: Vector3f) -> Option<Self> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        if !is_finite_point(&origin) || !direction.iter().all(|c| c.is_finite()) {
            return None;
        }
        Some(Self { origin, direction })
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Point3f {
        self.origin + self.direction * t
    }

    /// Parameter of the closest approach to `point`, clamped so it never lies behind the origin
    pub fn closest_point_t(&self, point: &Point3f) -> f32 {
        (point - self.origin).dot(&self.direction).max(0.0)
    }

    /// Squared distance between `point` and the ray
    pub fn distance_sq_to_point(&self, point: &Point3f) -> f32 {
        (self.at(self.closest_point_t(point)) - point).norm_squared()
    }

    /// Entry parameter of the ray into an axis-aligned box, or the exit
    /// parameter when the origin is inside it
    pub fn hit_aabb(&self, min: &Point3f, max: &Point3f) -> Option<f32> {
        ray_aabb_hit_t(&self.origin, &self.direction, min, max)
    }
}

/// Slab-method ray/AABB intersection. Returns the nearest non-negative `t`, if any.
pub fn ray_aabb_hit_t(
    origin: &Point3f,
    direction: &Vector3f,
    min: &Point3f,
    max: &Point3f,
) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d == 0.0 {
            // Parallel to this slab: inside it or never
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(if t_near >= 0.0 { t_near } else { t_far })
}
