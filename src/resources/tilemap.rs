//! Dense multi-layer tile grid.
//!
//! Each layer is a flat row-major `Vec<u32>` indexed `y * width + x`.
//! Tile `0` means empty; `1..=N` index the tileset atlas. The collision grid
//! is a separate flat boolean array allocated on the first write, so maps
//! that never mark a tile solid carry no collision storage.
//!
//! Out-of-range reads return `0` (tiles) or `true` (collision); out-of-range
//! writes are ignored.

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::geometry::Rect;

/// Empty tile id.
pub const EMPTY_TILE: u32 = 0;

/// Atlas descriptor shared by all layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tileset {
    pub name: String,
    pub image_path: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub columns: u32,
}

impl Tileset {
    /// Source rectangle (pixels) of a tile id inside the atlas image.
    /// `None` for the empty tile and ids past `tile_count`.
    pub fn source_rect(&self, tile_id: u32) -> Option<Rect> {
        if tile_id == EMPTY_TILE || tile_id > self.tile_count || self.columns == 0 {
            return None;
        }
        let index = tile_id - 1;
        let col = index % self.columns;
        let row = index / self.columns;
        Some(Rect::new(
            (col * self.tile_width) as f32,
            (row * self.tile_height) as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        ))
    }
}

/// A named layer of tile ids.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub data: Vec<u32>,
    pub visible: bool,
    pub opacity: f32,
}

/// Dense tile map. Inserted as a resource for the collision and render passes.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size: u32,
    layers: Vec<TileLayer>,
    collision: Vec<bool>,
    pub tileset: Option<Tileset>,
}

impl Tilemap {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            width,
            height,
            tile_size,
            layers: Vec::new(),
            collision: Vec::new(),
            tileset: None,
        }
    }

    /// Build a map with the given layer names, all empty and visible.
    pub fn with_layers(width: u32, height: u32, tile_size: u32, names: &[&str]) -> Self {
        let mut map = Self::new(width, height, tile_size);
        for name in names {
            map.add_layer(*name);
        }
        map
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Map size in world units.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            (self.width * self.tile_size) as f32,
            (self.height * self.tile_size) as f32,
        )
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&TileLayer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut TileLayer> {
        self.layers.get_mut(index)
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// Append an empty layer and return its index. An existing layer with the
    /// same name is reused.
    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        if let Some(index) = self.layer_index(&name) {
            return index;
        }
        self.layers.push(TileLayer {
            name,
            data: vec![EMPTY_TILE; self.cell_count()],
            visible: true,
            opacity: 1.0,
        });
        self.layers.len() - 1
    }

    /// Append a layer with existing data. Fails if the data length does not
    /// match the map size.
    pub fn push_layer(&mut self, layer: TileLayer) -> EngineResult<usize> {
        if layer.data.len() != self.cell_count() {
            return Err(EngineError::MalformedLevel(format!(
                "layer '{}' has {} tiles, expected {}",
                layer.name,
                layer.data.len(),
                self.cell_count()
            )));
        }
        self.layers.push(layer);
        Ok(self.layers.len() - 1)
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).is_some()
    }

    pub fn get_tile_at(&self, layer: usize, x: i32, y: i32) -> u32 {
        match (self.layers.get(layer), self.index_of(x, y)) {
            (Some(l), Some(i)) => l.data[i],
            _ => EMPTY_TILE,
        }
    }

    pub fn set_tile_at(&mut self, layer: usize, x: i32, y: i32, tile_id: u32) {
        if let Some(i) = self.index_of(x, y) {
            if let Some(l) = self.layers.get_mut(layer) {
                l.data[i] = tile_id;
            }
        }
    }

    /// Topmost nonzero tile across all layers at a cell.
    pub fn top_tile_at(&self, x: i32, y: i32) -> u32 {
        let Some(i) = self.index_of(x, y) else {
            return EMPTY_TILE;
        };
        self.layers
            .iter()
            .rev()
            .map(|l| l.data[i])
            .find(|id| *id != EMPTY_TILE)
            .unwrap_or(EMPTY_TILE)
    }

    /// Out-of-range cells are solid.
    pub fn is_collision_at(&self, x: i32, y: i32) -> bool {
        match self.index_of(x, y) {
            Some(i) => self.collision.get(i).copied().unwrap_or(false),
            None => true,
        }
    }

    pub fn set_collision_at(&mut self, x: i32, y: i32, solid: bool) {
        if let Some(i) = self.index_of(x, y) {
            let len = self.cell_count();
            self.collision_grid_mut(len)[i] = solid;
        }
    }

    fn collision_grid_mut(&mut self, len: usize) -> &mut Vec<bool> {
        if self.collision.len() != len {
            self.collision = vec![false; len];
        }
        &mut self.collision
    }

    /// Full collision grid, allocating it if it has never been written.
    pub fn collision_grid(&mut self) -> &[bool] {
        let len = self.cell_count();
        self.collision_grid_mut(len)
    }

    /// Replace the collision grid. Fails on a size mismatch.
    pub fn set_collision_grid(&mut self, grid: Vec<bool>) -> EngineResult<()> {
        if grid.len() != self.cell_count() {
            return Err(EngineError::MalformedLevel(format!(
                "collision layer has {} cells, expected {}",
                grid.len(),
                self.cell_count()
            )));
        }
        self.collision = grid;
        Ok(())
    }

    /// Number of solid in-range cells.
    pub fn collision_count(&self) -> usize {
        self.collision.iter().filter(|c| **c).count()
    }

    /// Fill a whole layer with one tile id.
    pub fn fill_layer(&mut self, layer: usize, tile_id: u32) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.data.fill(tile_id);
        }
    }

    /// Copy a `width x height` block of tiles with its top-left at `(x, y)`.
    ///
    /// The data length is validated before anything is written: on a
    /// mismatch the map is left untouched. Cells falling outside the map are
    /// skipped.
    pub fn apply_stamp(
        &mut self,
        layer: usize,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        data: &[u32],
    ) -> EngineResult<()> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            warn!(
                "Rejected stamp at ({}, {}): {}x{} needs {} tiles, got {}",
                x,
                y,
                width,
                height,
                expected,
                data.len()
            );
            return Err(EngineError::StampSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        for sy in 0..height {
            for sx in 0..width {
                let id = data[(sy * width + sx) as usize];
                self.set_tile_at(layer, x + sx as i32, y + sy as i32, id);
            }
        }
        Ok(())
    }

    /// Tile coordinate containing a world position.
    pub fn world_to_tile(&self, world: Vec2) -> (i32, i32) {
        let ts = self.tile_size.max(1) as f32;
        ((world.x / ts).floor() as i32, (world.y / ts).floor() as i32)
    }

    /// World rectangle covered by a tile coordinate.
    pub fn tile_rect(&self, x: i32, y: i32) -> Rect {
        let ts = self.tile_size as f32;
        Rect::new(x as f32 * ts, y as f32 * ts, ts, ts)
    }

    /// Inclusive tile coordinate range overlapped by a world rectangle.
    /// May extend outside the map.
    pub fn tiles_overlapping(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let ts = self.tile_size.max(1) as f32;
        let x0 = (rect.x / ts).floor() as i32;
        let y0 = (rect.y / ts).floor() as i32;
        // Subtract a hair so a rect ending exactly on a tile edge does not
        // reach into the next tile.
        let x1 = ((rect.right() - 1e-3) / ts).floor() as i32;
        let y1 = ((rect.bottom() - 1e-3) / ts).floor() as i32;
        (x0, y0, x1.max(x0), y1.max(y0))
    }
}
