//! Sparse chunked tile storage for large or authoring worlds.
//!
//! Tiles are grouped into square chunks of `chunk_size x chunk_size` that are
//! allocated the first time a write touches them. A missing chunk reads as
//! all zeros. Chunks are never reclaimed, even when every tile in them is
//! set back to zero.

use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::geometry::Rect;
use crate::resources::tilemap::{EMPTY_TILE, Tilemap};

/// Default chunk edge length in tiles.
pub const DEFAULT_CHUNK_SIZE: u32 = 16;

/// Chunk coordinate (in chunks, not tiles).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One allocated chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct TileChunk {
    pub coord: ChunkCoord,
    pub tiles: Vec<u32>,
    /// Set by every write, cleared by [`ChunkedTilemap::take_dirty`].
    pub dirty: bool,
}

impl TileChunk {
    fn new(coord: ChunkCoord, chunk_size: u32) -> Self {
        Self {
            coord,
            tiles: vec![EMPTY_TILE; (chunk_size * chunk_size) as usize],
            dirty: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(|t| *t == EMPTY_TILE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedTilemap {
    chunk_size: u32,
    tile_size: u32,
    chunks: FxHashMap<ChunkCoord, TileChunk>,
}

impl ChunkedTilemap {
    pub fn new(chunk_size: u32, tile_size: u32) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            tile_size: tile_size.max(1),
            chunks: FxHashMap::default(),
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TileChunk> {
        self.chunks.get(&coord)
    }

    /// Chunk coordinate and local index of a tile coordinate.
    fn locate(&self, x: i32, y: i32) -> (ChunkCoord, usize) {
        let cs = self.chunk_size as i32;
        let coord = ChunkCoord::new(x.div_euclid(cs), y.div_euclid(cs));
        let lx = x.rem_euclid(cs);
        let ly = y.rem_euclid(cs);
        (coord, (ly * cs + lx) as usize)
    }

    pub fn get_tile(&self, x: i32, y: i32) -> u32 {
        let (coord, local) = self.locate(x, y);
        self.chunks
            .get(&coord)
            .map(|c| c.tiles[local])
            .unwrap_or(EMPTY_TILE)
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile_id: u32) {
        let (coord, local) = self.locate(x, y);
        let chunk_size = self.chunk_size;
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| TileChunk::new(coord, chunk_size));
        chunk.tiles[local] = tile_id;
        chunk.dirty = true;
    }

    /// World rectangle covered by a chunk.
    pub fn chunk_world_rect(&self, coord: ChunkCoord) -> Rect {
        let span = (self.chunk_size * self.tile_size) as f32;
        Rect::new(coord.x as f32 * span, coord.y as f32 * span, span, span)
    }

    /// Allocated chunks overlapping a world-space rectangle, sorted by
    /// coordinate (row-major).
    pub fn chunks_in_viewport(&self, viewport: &Rect) -> Vec<&TileChunk> {
        let mut visible: Vec<&TileChunk> = self
            .chunks
            .values()
            .filter(|c| self.chunk_world_rect(c.coord).intersects(viewport))
            .collect();
        visible.sort_by_key(|c| (c.coord.y, c.coord.x));
        visible
    }

    /// Coordinates of dirty chunks, clearing their flags.
    pub fn take_dirty(&mut self) -> Vec<ChunkCoord> {
        let mut dirty: Vec<ChunkCoord> = self
            .chunks
            .values_mut()
            .filter(|c| c.dirty)
            .map(|c| {
                c.dirty = false;
                c.coord
            })
            .collect();
        dirty.sort_by_key(|c| (c.y, c.x));
        dirty
    }

    /// Dense row-major copy of the `width x height` region at the origin.
    pub fn to_flat_array(&self, width: u32, height: u32) -> Vec<u32> {
        let mut data = vec![EMPTY_TILE; width as usize * height as usize];
        for y in 0..height {
            for x in 0..width {
                data[(y * width + x) as usize] = self.get_tile(x as i32, y as i32);
            }
        }
        data
    }

    /// Build from dense row-major data. Only nonzero tiles are written, so
    /// all-zero regions allocate no chunks.
    pub fn from_flat_array(data: &[u32], width: u32, chunk_size: u32, tile_size: u32) -> Self {
        let mut map = Self::new(chunk_size, tile_size);
        if width == 0 {
            return map;
        }
        for (i, id) in data.iter().enumerate() {
            if *id != EMPTY_TILE {
                let x = (i % width as usize) as i32;
                let y = (i / width as usize) as i32;
                map.set_tile(x, y, *id);
            }
        }
        map
    }

    /// Chunked copy of one layer of a dense map.
    pub fn from_tilemap_layer(tilemap: &Tilemap, layer: usize, chunk_size: u32) -> Self {
        match tilemap.layer(layer) {
            Some(l) => Self::from_flat_array(&l.data, tilemap.width(), chunk_size, tilemap.tile_size()),
            None => Self::new(chunk_size, tilemap.tile_size()),
        }
    }

    /// Write this map's tiles into one layer of a dense map. Tiles outside
    /// the dense map are dropped.
    pub fn write_into(&self, tilemap: &mut Tilemap, layer: usize) {
        let data = self.to_flat_array(tilemap.width(), tilemap.height());
        if let Some(l) = tilemap.layer_mut(layer) {
            l.data = data;
        }
    }

    /// Tile coordinate containing a world position.
    pub fn world_to_tile(&self, world: Vec2) -> (i32, i32) {
        let ts = self.tile_size as f32;
        ((world.x / ts).floor() as i32, (world.y / ts).floor() as i32)
    }
}
