//! Point buffer data structure and functionality

use crate::color::Color;
use crate::point::*;

/// Parallel position and colour arrays for one batch of points.
///
/// Positions are always finite and colour channels always lie in `[0, 1]`:
/// [`PointBuffer::push`] rejects non-finite positions and clamps colours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBuffer {
    positions: Vec<Point3f>,
    colors: Vec<Color>,
}

impl PointBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new buffer with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of points in the buffer
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append a point. Returns `false` (and stores nothing) for a non-finite position.
    pub fn push(&mut self, position: Point3f, color: Color) -> bool {
        if !is_finite_point(&position) {
            return false;
        }
        self.positions.push(position);
        self.colors.push(color.clamped());
        true
    }

    /// Reserve capacity for additional points
    pub fn reserve(&mut self, additional: usize) {
        self.positions.reserve(additional);
        self.colors.reserve(additional);
    }

    /// Append every point of `other`
    pub fn append(&mut self, other: &PointBuffer) {
        self.positions.extend_from_slice(&other.positions);
        self.colors.extend_from_slice(&other.colors);
    }

    pub fn positions(&self) -> &[Point3f] {
        &self.positions
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn position(&self, index: usize) -> Option<&Point3f> {
        self.positions.get(index)
    }

    pub fn color(&self, index: usize) -> Option<&Color> {
        self.colors.get(index)
    }

    /// Overwrite the colour of one point. Returns `false` if `index` is out of range.
    pub fn set_color(&mut self, index: usize, color: Color) -> bool {
        match self.colors.get_mut(index) {
            Some(slot) => {
                *slot = color.clamped();
                true
            }
            None => false,
        }
    }

    /// Move one point. Returns `false` if `index` is out of range or the position is not finite.
    pub fn set_position(&mut self, index: usize, position: Point3f) -> bool {
        if !is_finite_point(&position) {
            return false;
        }
        match self.positions.get_mut(index) {
            Some(slot) => {
                *slot = position;
                true
            }
            None => false,
        }
    }

    /// Iterate over `(position, colour)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&Point3f, &Color)> + '_ {
        self.positions.iter().zip(self.colors.iter())
    }

    /// Clear all points from the buffer
    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
    }
}

impl FromIterator<(Point3f, Color)> for PointBuffer {
    fn from_iter<I: IntoIterator<Item = (Point3f, Color)>>(iter: I) -> Self {
        let mut buffer = PointBuffer::new();
        for (position, color) in iter {
            buffer.push(position, color);
        }
        buffer
    }
}

impl Extend<(Point3f, Color)> for PointBuffer {
    fn extend<I: IntoIterator<Item = (Point3f, Color)>>(&mut self, iter: I) {
        for (position, color) in iter {
            self.push(position, color);
        }
    }
}
