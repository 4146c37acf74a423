//! Per-frame draw submissions handed to a render surface

use crate::batch::{BatchRole, PointBatch};
use crate::color::Color;
use crate::point::*;
use crate::traits::RenderSurface;
use crate::Result;
use nalgebra::Matrix4;

/// Size of the drawing surface in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height yields an aspect of 1.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Minimized windows report a zero dimension
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Camera data a renderer needs to place camera-facing point sprites
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCamera {
    /// Projection times view, OpenGL clip conventions
    pub view_proj: Matrix4<f32>,
    pub eye: Point3f,
    /// Camera right axis in world space
    pub right: Vector3f,
    /// Camera up axis in world space
    pub up: Vector3f,
}

impl FrameCamera {
    pub fn new(view_proj: Matrix4<f32>, eye: Point3f, right: Vector3f, up: Vector3f) -> Self {
        Self {
            view_proj,
            eye,
            right,
            up,
        }
    }
}

/// One batch queued for drawing
#[derive(Debug, Clone, Copy)]
pub struct DrawBatch<'a> {
    pub role: BatchRole,
    pub batch: &'a PointBatch,
}

/// Everything drawn in one frame, in draw order
#[derive(Debug, Clone)]
pub struct DrawList<'a> {
    pub camera: FrameCamera,
    pub background: Color,
    pub batches: Vec<DrawBatch<'a>>,
}

impl<'a> DrawList<'a> {
    pub fn new(camera: FrameCamera, background: Color) -> Self {
        Self {
            camera,
            background,
            batches: Vec::new(),
        }
    }

    /// Queue a batch. Hidden and empty batches are skipped.
    pub fn push(&mut self, role: BatchRole, batch: &'a PointBatch) {
        if batch.is_visible() && !batch.is_empty() {
            self.batches.push(DrawBatch { role, batch });
        }
    }

    pub fn point_count(&self) -> usize {
        self.batches.iter().map(|b| b.batch.len()).sum()
    }

    pub fn contains(&self, role: BatchRole) -> bool {
        self.batches.iter().any(|b| b.role == role)
    }
}

/// A surface that draws nothing and records what it was given.
///
/// Used by headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    pub size: Option<ViewportSize>,
    pub frames: u64,
    pub last_point_count: usize,
    pub last_roles: Vec<BatchRole>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, size: ViewportSize) {
        self.size = Some(size);
    }

    fn draw(&mut self, list: &DrawList<'_>) -> Result<()> {
        self.frames += 1;
        self.last_point_count = list.point_count();
        self.last_roles = list.batches.iter().map(|b| b.role).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::PointMaterial;
    use crate::point_buffer::PointBuffer;

    fn camera() -> FrameCamera {
        FrameCamera::new(Matrix4::identity(), Point3f::origin(), Vector3f::x(), Vector3f::y())
    }

    #[test]
    fn test_hidden_and_empty_batches_are_skipped() {
        let points: PointBuffer = vec![(Point3f::origin(), Color::WHITE)].into_iter().collect();
        let visible = PointBatch::new(points.clone(), PointMaterial::default());
        let mut hidden = PointBatch::new(points, PointMaterial::default());
        hidden.set_visible(false);
        let empty = PointBatch::new(PointBuffer::new(), PointMaterial::default());

        let mut list = DrawList::new(camera(), Color::BLACK);
        list.push(BatchRole::Ground, &visible);
        list.push(BatchRole::Tree, &hidden);
        list.push(BatchRole::Forest, &empty);

        assert_eq!(list.batches.len(), 1);
        assert!(list.contains(BatchRole::Ground));
        assert_eq!(list.point_count(), 1);
    }

    #[test]
    fn test_viewport_aspect() {
        assert_eq!(ViewportSize::new(1600, 800).aspect(), 2.0);
        assert_eq!(ViewportSize::new(100, 0).aspect(), 1.0);
        assert!(ViewportSize::new(0, 10).is_empty());
    }

    #[test]
    fn test_headless_surface_records_frames() {
        let mut surface = HeadlessSurface::new();
        surface.resize(ViewportSize::new(640, 480));
        surface.draw(&DrawList::new(camera(), Color::BLACK)).unwrap();
        assert_eq!(surface.frames, 1);
        assert_eq!(surface.size, Some(ViewportSize::new(640, 480)));
    }
}
