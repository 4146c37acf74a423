//! Renderable point batches and their roles in the scene

use crate::color::Color;
use crate::point::Point3f;
use crate::point_buffer::PointBuffer;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Role of a batch in the scene. Doubles as the draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BatchRole {
    Ground,
    Forest,
    Tree,
    Hotspots,
    HoverFrame,
}

impl BatchRole {
    pub const ALL: [BatchRole; 5] = [
        BatchRole::Ground,
        BatchRole::Forest,
        BatchRole::Tree,
        BatchRole::Hotspots,
        BatchRole::HoverFrame,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BatchRole::Ground => "ground",
            BatchRole::Forest => "forest",
            BatchRole::Tree => "tree",
            BatchRole::Hotspots => "hotspots",
            BatchRole::HoverFrame => "hover_frame",
        }
    }
}

/// Material shared by every point in a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Point size in world units
    pub size: f32,
    pub opacity: f32,
}

impl PointMaterial {
    pub fn new(size: f32, opacity: f32) -> Self {
        Self { size, opacity }
    }

    pub fn opaque(size: f32) -> Self {
        Self::new(size, 1.0)
    }
}

impl Default for PointMaterial {
    fn default() -> Self {
        Self::opaque(1.0)
    }
}

/// A point buffer with its material.
///
/// Every mutation takes a fresh `revision` stamp. Stamps are unique across
/// all batches, so a renderer can cache uploads per role and re-upload only
/// when the stamp it sees differs from the one it uploaded, even if the
/// batch in that role was replaced.
#[derive(Debug, Clone)]
pub struct PointBatch {
    buffer: PointBuffer,
    material: PointMaterial,
    visible: bool,
    revision: u64,
}

impl PointBatch {
    pub fn new(buffer: PointBuffer, material: PointMaterial) -> Self {
        Self {
            buffer,
            material,
            visible: true,
            revision: next_revision(),
        }
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    pub fn material(&self) -> PointMaterial {
        self.material
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_color(&mut self, index: usize, color: Color) -> bool {
        let changed = self.buffer.set_color(index, color);
        if changed {
            self.revision = next_revision();
        }
        changed
    }

    pub fn set_position(&mut self, index: usize, position: Point3f) -> bool {
        let changed = self.buffer.set_position(index, position);
        if changed {
            self.revision = next_revision();
        }
        changed
    }

    pub fn set_size(&mut self, size: f32) {
        if self.material.size != size {
            self.material.size = size;
            self.revision = next_revision();
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.revision = next_revision();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> PointBatch {
        let buffer: PointBuffer = vec![
            (Point3f::origin(), Color::RED),
            (Point3f::new(1.0, 0.0, 0.0), Color::RED),
        ]
        .into_iter()
        .collect();
        PointBatch::new(buffer, PointMaterial::opaque(0.15))
    }

    #[test]
    fn test_mutations_bump_revision() {
        let mut b = batch();
        let created = b.revision();

        b.set_color(1, Color::YELLOW);
        let recolored = b.revision();
        assert!(recolored > created);

        b.set_size(0.2);
        let resized = b.revision();
        b.set_size(0.2);
        assert!(resized > recolored);
        assert_eq!(b.revision(), resized);

        b.set_visible(false);
        assert!(b.revision() > resized);
        assert!(!b.is_visible());
    }

    #[test]
    fn test_out_of_range_write_is_ignored() {
        let mut b = batch();
        let created = b.revision();
        assert!(!b.set_color(5, Color::YELLOW));
        assert_eq!(b.revision(), created);
    }

    #[test]
    fn test_revisions_differ_between_batches() {
        assert_ne!(batch().revision(), batch().revision());
    }

    #[test]
    fn test_roles_are_ordered_for_drawing() {
        let mut roles = BatchRole::ALL.to_vec();
        roles.reverse();
        roles.sort();
        assert_eq!(roles, BatchRole::ALL.to_vec());
        assert_eq!(BatchRole::HoverFrame.name(), "hover_frame");
    }
}
