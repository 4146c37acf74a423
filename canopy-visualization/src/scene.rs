//! Scene registry: point batches keyed by their role

use canopy_core::{BatchRole, Color, DrawList, FrameCamera, PointBatch};
use std::collections::BTreeMap;

/// The batches that make up the scene, one per role
#[derive(Debug, Clone, Default)]
pub struct Scene {
    batches: BTreeMap<BatchRole, PointBatch>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the batch for `role`, returning the previous one
    pub fn insert(&mut self, role: BatchRole, batch: PointBatch) -> Option<PointBatch> {
        log::debug!("scene: {} batch with {} points", role.name(), batch.len());
        self.batches.insert(role, batch)
    }

    pub fn get(&self, role: BatchRole) -> Option<&PointBatch> {
        self.batches.get(&role)
    }

    pub fn get_mut(&mut self, role: BatchRole) -> Option<&mut PointBatch> {
        self.batches.get_mut(&role)
    }

    pub fn remove(&mut self, role: BatchRole) -> Option<PointBatch> {
        self.batches.remove(&role)
    }

    pub fn contains(&self, role: BatchRole) -> bool {
        self.batches.contains_key(&role)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Total points over all batches
    pub fn point_count(&self) -> usize {
        self.batches.values().map(PointBatch::len).sum()
    }

    /// Batches in draw order
    pub fn iter(&self) -> impl Iterator<Item = (BatchRole, &PointBatch)> + '_ {
        self.batches.iter().map(|(role, batch)| (*role, batch))
    }

    /// A draw list holding every visible, non-empty batch in role order
    pub fn draw_list(&self, camera: FrameCamera, background: Color) -> DrawList<'_> {
        let mut list = DrawList::new(camera, background);
        for (role, batch) in self.iter() {
            list.push(role, batch);
        }
        list
    }
}
