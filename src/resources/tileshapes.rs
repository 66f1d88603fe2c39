//! Tile id to collision shape registry.

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use rustc_hash::FxHashMap;

/// Collision geometry of a tile.
///
/// `Polygon` points are in pixels relative to the tile's top-left corner and
/// are resolved through their bounding box. `OneWay` carries its pass-through
/// normal but resolves exactly like `FullBlock`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CollisionShape {
    #[default]
    None,
    FullBlock,
    Polygon(Vec<Vec2>),
    OneWay { normal: Vec2 },
}

impl CollisionShape {
    pub fn is_solid(&self) -> bool {
        !matches!(self, CollisionShape::None)
    }
}

/// Shapes registered per tile id. Unregistered ids have no shape of their
/// own; a cell flagged in the tilemap collision grid then counts as a full
/// block.
#[derive(Resource, Debug, Clone, Default)]
pub struct TileShapes {
    shapes: FxHashMap<u32, CollisionShape>,
}

impl TileShapes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tile_id: u32, shape: CollisionShape) {
        self.shapes.insert(tile_id, shape);
    }

    pub fn get(&self, tile_id: u32) -> Option<&CollisionShape> {
        self.shapes.get(&tile_id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
