//! Axis-aligned rectangle shared by colliders, tiles, chunks and the camera.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rectangle from a corner and a size. Negative sizes are
    /// normalized so that `min <= max` always holds.
    pub fn from_corner_size(corner: Vec2, size: Vec2) -> Self {
        let p1 = corner + size;
        let min = corner.min(p1);
        let max = corner.max(p1);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap test. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Same rectangle moved so that its top-left corner is `corner`.
    pub fn with_position(mut self, corner: Vec2) -> Self {
        self.x = corner.x;
        self.y = corner.y;
        self
    }

    /// Smallest rectangle enclosing every point. `None` for an empty slice.
    pub fn bounding(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}
