//! Perspective camera

use canopy_core::{CameraConfig, FrameCamera, Point2f, Point3f, Ray, Vector3f, ViewportSize};
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3};

/// A perspective camera looking from `position` at `target`
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3f,
    pub target: Point3f,
    pub up: Vector3f,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3f,
        target: Point3f,
        up: Vector3f,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        Self::new(
            config.position,
            config.target,
            canopy_core::world_up(),
            config.fov_degrees.to_radians(),
            aspect_ratio,
            config.near,
            config.far,
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix (OpenGL clip conventions)
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.perspective().into_inner()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    fn perspective(&self) -> Perspective3<f32> {
        Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far)
    }

    /// Unit view direction
    pub fn forward(&self) -> Vector3f {
        (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3f::z())
    }

    /// Unit right axis of the view
    pub fn right(&self) -> Vector3f {
        self.forward()
            .cross(&self.up)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3f::x)
    }

    /// Unit up axis of the view, orthogonal to `forward` and `right`
    pub fn view_up(&self) -> Vector3f {
        self.right().cross(&self.forward())
    }

    pub fn distance(&self) -> f32 {
        (self.target - self.position).norm()
    }

    /// Follow a viewport size change. Empty viewports keep the old aspect.
    pub fn set_viewport(&mut self, size: ViewportSize) {
        if !size.is_empty() {
            self.aspect_ratio = size.aspect();
        }
    }

    /// Camera data for one frame of drawing
    pub fn frame(&self) -> FrameCamera {
        FrameCamera::new(self.view_projection(), self.position, self.right(), self.view_up())
    }

    /// World-space ray from the eye through a point in normalized device
    /// coordinates (x right, y up, both in [-1, 1]).
    pub fn ray_from_ndc(&self, ndc: &Point2f) -> Option<Ray> {
        let on_far_plane = self.perspective().unproject_point(&Point3::new(ndc.x, ndc.y, 1.0));
        let view = Isometry3::look_at_rh(&self.position, &self.target, &self.up);
        let world = view.inverse_transform_point(&on_far_plane);
        Ray::new(self.position, world - self.position)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn looking_down_negative_z() -> Camera {
        Camera::new(
            Point3f::origin(),
            Point3f::new(0.0, 0.0, -10.0),
            Vector3f::y(),
            FRAC_PI_2,
            1.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn test_basis() {
        let camera = looking_down_negative_z();
        assert_relative_eq!(camera.forward(), -Vector3f::z());
        assert_relative_eq!(camera.right(), Vector3f::x());
        assert_relative_eq!(camera.view_up(), Vector3f::y());
    }

    #[test]
    fn test_center_ray_follows_view_direction() {
        let camera = Camera::default();
        let ray = camera.ray_from_ndc(&Point2f::origin()).unwrap();
        assert_relative_eq!(ray.origin, camera.position);
        assert_relative_eq!(ray.direction, camera.forward(), epsilon = 1e-4);
    }

    #[test]
    fn test_edge_ray_spans_half_fov() {
        // 90 degree fov, square aspect: the right edge is 45 degrees off axis
        let camera = looking_down_negative_z();
        let ray = camera.ray_from_ndc(&Point2f::new(1.0, 0.0)).unwrap();
        let expected = Vector3f::new(1.0, 0.0, -1.0).normalize();
        assert_relative_eq!(ray.direction, expected, epsilon = 1e-4);

        let up = camera.ray_from_ndc(&Point2f::new(0.0, 1.0)).unwrap();
        assert!(up.direction.y > 0.0);
    }

    #[test]
    fn test_projection_maps_target_to_center() {
        let camera = Camera::default();
        let clip = camera.view_projection() * camera.target.to_homogeneous();
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_viewport_keeps_aspect() {
        let mut camera = Camera::default();
        camera.set_viewport(ViewportSize::new(800, 400));
        assert_relative_eq!(camera.aspect_ratio, 2.0);
        camera.set_viewport(ViewportSize::new(0, 400));
        assert_relative_eq!(camera.aspect_ratio, 2.0);
    }
}
