//! Procedural level generation.
//!
//! A [`WorldGenerator`] is initialized once from an asset manifest (paths
//! like `Tiles/Terrains/Grass.png`). Initialization samples and classifies
//! the manifest and packs the atlas on a background thread. Once the atlas
//! is ready, [`WorldGenerator::generate`] builds levels from a
//! [`GenerationConfig`]:
//!
//! 1. a collidable wall/fence ring on the border,
//! 2. interior terrain chosen from the majority type of already-placed
//!    neighbors and its compatible types,
//! 3. a floor tile under every interior cell left without terrain,
//! 4. sparse collidable structures that never touch each other,
//! 5. a `player_spawn` record at the room center.
//!
//! Every pass visits cells a bounded number of times, so generation always
//! terminates.

pub mod asset;
pub mod atlas;
pub mod classifier;
pub mod config;
pub mod rng;

use std::sync::Arc;

use log::{error, info};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{EngineError, EngineResult};
use crate::resources::level::{EntityRecord, Level};
use crate::resources::tilemap::{EMPTY_TILE, Tilemap};

use self::asset::{WorldAsset, sample_manifest};
use self::atlas::{Atlas, AtlasLoader, ImageFetcher};
use self::classifier::{CompatibilityGraph, TileType, structure_types_for};
use self::config::GenerationConfig;
use self::rng::GenRng;

pub const BACKGROUND_LAYER: &str = "background";
pub const TERRAIN_LAYER: &str = "terrain";
pub const STRUCTURES_LAYER: &str = "structures";

const BACKGROUND: usize = 0;
const TERRAIN: usize = 1;
const STRUCTURES: usize = 2;

/// Fraction of cells that get a structure placement attempt at density 1.
const STRUCTURE_ATTEMPT_RATE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Uninitialized,
    /// Atlas is being packed in the background.
    Loading,
    Initialized,
}

pub struct WorldGenerator {
    fetcher: Arc<dyn ImageFetcher>,
    atlas_tile_size: u32,
    graph: CompatibilityGraph,
    /// Sampled assets; tile id `i + 1` is `assets[i]`.
    assets: Vec<WorldAsset>,
    by_type: FxHashMap<TileType, Vec<u32>>,
    loader: Option<AtlasLoader>,
    state: GeneratorState,
}

impl WorldGenerator {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, atlas_tile_size: u32) -> Self {
        Self {
            fetcher,
            atlas_tile_size: atlas_tile_size.max(1),
            graph: CompatibilityGraph::standard(),
            assets: Vec::new(),
            by_type: FxHashMap::default(),
            loader: None,
            state: GeneratorState::Uninitialized,
        }
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn assets(&self) -> &[WorldAsset] {
        &self.assets
    }

    /// Tile ids classified as `tile_type`, in manifest order.
    pub fn tiles_of_type(&self, tile_type: TileType) -> &[u32] {
        self.by_type.get(&tile_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tile_type_of(&self, tile_id: u32) -> Option<TileType> {
        if tile_id == EMPTY_TILE {
            return None;
        }
        self.assets
            .get(tile_id as usize - 1)
            .map(WorldAsset::tile_type)
    }

    /// The packed atlas, once loading finished.
    pub fn atlas(&self) -> Option<&Atlas> {
        self.loader.as_ref().and_then(AtlasLoader::atlas)
    }

    /// Sample and classify the manifest, then start packing the atlas on a
    /// background thread. Restarting discards any previous initialization.
    pub fn begin_initialize(&mut self, paths: &[String], max_assets: usize) {
        let sampled = sample_manifest(paths, max_assets);
        if sampled.len() < paths.len() {
            info!(
                "Manifest has {} assets, sampled down to {}",
                paths.len(),
                sampled.len()
            );
        }

        self.assets = sampled.iter().map(|p| WorldAsset::parse_path(p)).collect();
        self.by_type.clear();
        for (index, asset) in self.assets.iter().enumerate() {
            self.by_type
                .entry(asset.tile_type())
                .or_default()
                .push(index as u32 + 1);
        }
        let mut summary: Vec<_> = self.by_type.iter().map(|(t, ids)| (*t, ids.len())).collect();
        summary.sort();
        info!("Classified {} assets: {:?}", self.assets.len(), summary);

        self.loader = Some(AtlasLoader::spawn(
            Arc::clone(&self.fetcher),
            sampled,
            self.atlas_tile_size,
        ));
        self.state = GeneratorState::Loading;
    }

    /// Non-blocking readiness check. Moves to `Initialized` once the atlas
    /// arrives.
    pub fn is_ready(&mut self) -> bool {
        if self.state != GeneratorState::Loading {
            return self.state == GeneratorState::Initialized;
        }
        let Some(loader) = self.loader.as_mut() else {
            return false;
        };
        match loader.poll() {
            Ok(true) => {
                self.state = GeneratorState::Initialized;
                true
            }
            Ok(false) => false,
            Err(e) => {
                error!("Generator initialization failed: {}", e);
                self.loader = None;
                self.state = GeneratorState::Uninitialized;
                false
            }
        }
    }

    /// Block until the atlas is ready.
    pub fn wait_ready(&mut self) -> EngineResult<()> {
        match self.state {
            GeneratorState::Initialized => Ok(()),
            GeneratorState::Uninitialized => Err(EngineError::GeneratorNotInitialized),
            GeneratorState::Loading => {
                let loader = self
                    .loader
                    .as_mut()
                    .ok_or(EngineError::GeneratorNotInitialized)?;
                if let Err(e) = loader.wait() {
                    self.loader = None;
                    self.state = GeneratorState::Uninitialized;
                    return Err(e);
                }
                self.state = GeneratorState::Initialized;
                Ok(())
            }
        }
    }

    pub fn initialize(&mut self, paths: &[String], max_assets: usize) -> EngineResult<()> {
        self.begin_initialize(paths, max_assets);
        self.wait_ready()
    }

    /// Build a level. Requires a finished initialization.
    pub fn generate(&self, config: &GenerationConfig) -> EngineResult<Level> {
        if self.state != GeneratorState::Initialized {
            return Err(EngineError::GeneratorNotInitialized);
        }
        let (width, height) = config.dimensions();
        let tile_size = config.tile_size.max(1);
        let mut rng = GenRng::from_seed(config.seed);
        if !rng.is_seeded() {
            info!("No seed given, generating from entropy");
        }

        let mut map = Tilemap::with_layers(
            width,
            height,
            tile_size,
            &[BACKGROUND_LAYER, TERRAIN_LAYER, STRUCTURES_LAYER],
        );

        let terrain = self.place_terrain(&mut map, &mut rng, config.terrain_density());
        let floor = self.fill_floor(&mut map);
        let structures = self.place_structures(&mut map, &mut rng, config.structure_density());

        if let Some(atlas) = self.atlas() {
            map.tileset = Some(atlas.tileset("atlas", "atlas.png"));
        }

        let (cx, cy) = center(width, height);
        let mut level = Level::new("generated", map);
        level.entities.push(EntityRecord::new(
            "player_spawn",
            (cx as u32 * tile_size) as f32,
            (cy as u32 * tile_size) as f32,
            1,
        ));

        info!(
            "Generated {}x{} level: {} terrain, {} floor, {} structures",
            width, height, terrain, floor, structures
        );
        Ok(level)
    }

    /// Border ring and interior terrain, in raster order.
    fn place_terrain(&self, map: &mut Tilemap, rng: &mut GenRng, density: f32) -> usize {
        let (w, h) = (map.width() as i32, map.height() as i32);
        let border = self.border_candidates();
        let mut placed = 0;

        for y in 0..h {
            for x in 0..w {
                if is_border(x, y, w, h) {
                    if let Some(&id) = rng.choose(&border) {
                        map.set_tile_at(TERRAIN, x, y, id);
                    }
                    map.set_collision_at(x, y, true);
                    continue;
                }
                if !rng.chance(density) {
                    continue;
                }
                let majority = self.neighbor_majority(map, x, y);
                let candidates = self.terrain_candidates(majority);
                if let Some(&id) = rng.choose(&candidates) {
                    map.set_tile_at(TERRAIN, x, y, id);
                    placed += 1;
                }
            }
        }
        placed
    }

    /// Interior cells without terrain get the base floor tile.
    fn fill_floor(&self, map: &mut Tilemap) -> usize {
        let Some(floor) = self.floor_tile() else {
            return 0;
        };
        let (w, h) = (map.width() as i32, map.height() as i32);
        let mut filled = 0;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                if map.get_tile_at(TERRAIN, x, y) == EMPTY_TILE {
                    map.set_tile_at(BACKGROUND, x, y, floor);
                    filled += 1;
                }
            }
        }
        filled
    }

    fn place_structures(&self, map: &mut Tilemap, rng: &mut GenRng, density: f32) -> usize {
        let (w, h) = (map.width() as i32, map.height() as i32);
        let attempts = (w as f32 * h as f32 * density * STRUCTURE_ATTEMPT_RATE).floor() as usize;
        let (cx, cy) = center(map.width(), map.height());
        let mut placed = 0;

        for _ in 0..attempts {
            let x = rng.range(1, (w - 1) as u32) as i32;
            let y = rng.range(1, (h - 1) as u32) as i32;
            // Keep the spawn cell and its ring walkable.
            if (x - cx).abs() <= 1 && (y - cy).abs() <= 1 {
                continue;
            }
            if has_structure_nearby(map, x, y) {
                continue;
            }
            let allowed = structure_types_for(self.cell_type(map, x, y));
            let candidates: Vec<u32> = allowed
                .iter()
                .flat_map(|t| self.tiles_of_type(*t).iter().copied())
                .collect();
            if let Some(&id) = rng.choose(&candidates) {
                map.set_tile_at(STRUCTURES, x, y, id);
                map.set_collision_at(x, y, true);
                placed += 1;
            }
        }
        placed
    }

    /// Most common type among placed interior orthogonal neighbors. Ties go
    /// to the type seen first (left, up, right, down).
    fn neighbor_majority(&self, map: &Tilemap, x: i32, y: i32) -> Option<TileType> {
        let (w, h) = (map.width() as i32, map.height() as i32);
        let mut counts: SmallVec<[(TileType, u8); 4]> = SmallVec::new();
        for (nx, ny) in [(x - 1, y), (x, y - 1), (x + 1, y), (x, y + 1)] {
            if !map.in_bounds(nx, ny) || is_border(nx, ny, w, h) {
                continue;
            }
            let Some(t) = self.cell_type(map, nx, ny) else {
                continue;
            };
            match counts.iter_mut().find(|(seen, _)| *seen == t) {
                Some((_, n)) => *n += 1,
                None => counts.push((t, 1)),
            }
        }
        let best = counts.iter().map(|(_, n)| *n).max()?;
        counts.iter().find(|(_, n)| *n == best).map(|(t, _)| *t)
    }

    /// Ground type of a cell: terrain layer first, then background.
    fn cell_type(&self, map: &Tilemap, x: i32, y: i32) -> Option<TileType> {
        self.tile_type_of(map.get_tile_at(TERRAIN, x, y))
            .or_else(|| self.tile_type_of(map.get_tile_at(BACKGROUND, x, y)))
    }

    fn terrain_candidates(&self, majority: Option<TileType>) -> Vec<u32> {
        let types: &[TileType] = match majority {
            Some(t) => self.graph.compatible(t),
            None => &TileType::BASE_TERRAIN,
        };
        let mut ids: Vec<u32> = types
            .iter()
            .filter(|t| t.is_terrain())
            .flat_map(|t| self.tiles_of_type(*t).iter().copied())
            .collect();
        if ids.is_empty() {
            ids = self.any_terrain();
        }
        ids
    }

    fn border_candidates(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .by_type
            .iter()
            .filter(|(t, _)| t.is_boundary())
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        if ids.is_empty() {
            return self.any_terrain();
        }
        ids.sort_unstable();
        ids
    }

    fn floor_tile(&self) -> Option<u32> {
        TileType::BASE_TERRAIN
            .iter()
            .find_map(|t| self.tiles_of_type(*t).first().copied())
            .or_else(|| self.any_terrain().first().copied())
    }

    fn any_terrain(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .by_type
            .iter()
            .filter(|(t, _)| t.is_terrain())
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        // Map iteration order is unspecified; sort for reproducibility.
        ids.sort_unstable();
        ids
    }
}

fn is_border(x: i32, y: i32, w: i32, h: i32) -> bool {
    x == 0 || y == 0 || x == w - 1 || y == h - 1
}

fn center(width: u32, height: u32) -> (i32, i32) {
    ((width / 2) as i32, (height / 2) as i32)
}

fn has_structure_nearby(map: &Tilemap, x: i32, y: i32) -> bool {
    (-1..=1).any(|dy| (-1..=1).any(|dx| map.get_tile_at(STRUCTURES, x + dx, y + dy) != EMPTY_TILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    struct BlankFetcher;

    impl ImageFetcher for BlankFetcher {
        fn fetch(&self, path: &str) -> EngineResult<DynamicImage> {
            if path.contains("Missing") {
                return Err(EngineError::AssetLoad {
                    path: path.to_string(),
                    reason: "not found".to_string(),
                });
            }
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(2, 2)))
        }
    }

    fn paths(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ready_generator(names: &[&str]) -> WorldGenerator {
        let mut generator = WorldGenerator::new(Arc::new(BlankFetcher), 4);
        generator.initialize(&paths(names), 256).unwrap();
        generator
    }

    fn rich_manifest() -> Vec<&'static str> {
        vec![
            "Tiles/Terrains/Grass.png",
            "Tiles/Terrains/Sand.png",
            "Tiles/Terrains/Pavement.png",
            "Tiles/Terrains/Road.png",
            "Tiles/Terrains/Water.png",
            "Tiles/Walls/Wall.png",
            "Tiles/Walls/Fence.png",
            "Tiles/Buildings/House.png",
            "Tiles/Vehicles/Car.png",
            "Tiles/Props/Bench.png",
            "Tiles/Plants/Tree.png",
        ]
    }

    #[test]
    fn test_generate_requires_initialization() {
        let generator = WorldGenerator::new(Arc::new(BlankFetcher), 4);
        let result = generator.generate(&GenerationConfig::default());
        assert!(matches!(result, Err(EngineError::GeneratorNotInitialized)));
    }

    #[test]
    fn test_wait_ready_without_begin_fails() {
        let mut generator = WorldGenerator::new(Arc::new(BlankFetcher), 4);
        assert!(matches!(
            generator.wait_ready(),
            Err(EngineError::GeneratorNotInitialized)
        ));
        assert!(!generator.is_ready());
    }

    #[test]
    fn test_grass_wall_building_room() {
        let generator = ready_generator(&[
            "Tiles/Terrains/Grass.png",
            "Tiles/Terrains/Wall.png",
            "Tiles/Buildings/Building.png",
        ]);
        let config = GenerationConfig::new(7, 7, 32)
            .with_seed(42)
            .with_densities(1.0, 0.0);
        let level = generator.generate(&config).unwrap();
        let map = &level.tilemap;

        let mut walls = 0;
        let mut grass = 0;
        for y in 0..7 {
            for x in 0..7 {
                match generator.tile_type_of(map.get_tile_at(TERRAIN, x, y)) {
                    Some(TileType::Wall) => {
                        walls += 1;
                        assert!(map.is_collision_at(x, y));
                    }
                    Some(TileType::Grass) => grass += 1,
                    other => panic!("unexpected tile {:?} at {},{}", other, x, y),
                }
                assert_eq!(map.get_tile_at(STRUCTURES, x, y), EMPTY_TILE);
            }
        }
        assert_eq!(walls, 24);
        assert_eq!(grass, 25);
        assert_eq!(map.collision_count(), 24);
    }

    #[test]
    fn test_same_seed_same_level() {
        let generator = ready_generator(&rich_manifest());
        let config = GenerationConfig::new(24, 18, 16)
            .with_seed(1234)
            .with_densities(0.7, 1.0);
        let a = generator.generate(&config).unwrap();
        let b = generator.generate(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_border_is_always_collidable() {
        let generator = ready_generator(&rich_manifest());
        for seed in 0..5 {
            let config = GenerationConfig::new(15, 11, 16).with_seed(seed);
            let level = generator.generate(&config).unwrap();
            let map = &level.tilemap;
            for y in 0..11 {
                for x in 0..15 {
                    if is_border(x, y, 15, 11) {
                        assert!(map.is_collision_at(x, y), "seed {} cell {},{}", seed, x, y);
                        let t = generator.tile_type_of(map.get_tile_at(TERRAIN, x, y));
                        assert!(t.is_some_and(TileType::is_boundary));
                    }
                }
            }
        }
    }

    #[test]
    fn test_structures_never_touch_and_block() {
        let generator = ready_generator(&rich_manifest());
        let config = GenerationConfig::new(40, 40, 16)
            .with_seed(9)
            .with_densities(1.0, 1.0);
        let level = generator.generate(&config).unwrap();
        let map = &level.tilemap;
        let mut found = 0;
        for y in 1..39 {
            for x in 1..39 {
                if map.get_tile_at(STRUCTURES, x, y) == EMPTY_TILE {
                    continue;
                }
                found += 1;
                assert!(map.is_collision_at(x, y));
                let t = generator.tile_type_of(map.get_tile_at(STRUCTURES, x, y));
                assert!(t.is_some_and(TileType::is_structure));
                for (dx, dy) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
                    assert_eq!(map.get_tile_at(STRUCTURES, x + dx, y + dy), EMPTY_TILE);
                }
            }
        }
        assert!(found > 0);
    }

    #[test]
    fn test_zero_terrain_density_fills_floor() {
        let generator = ready_generator(&rich_manifest());
        let config = GenerationConfig::new(9, 9, 16)
            .with_seed(3)
            .with_densities(0.0, 0.0);
        let level = generator.generate(&config).unwrap();
        let map = &level.tilemap;
        for y in 1..8 {
            for x in 1..8 {
                assert_eq!(map.get_tile_at(TERRAIN, x, y), EMPTY_TILE);
                assert_eq!(
                    generator.tile_type_of(map.get_tile_at(BACKGROUND, x, y)),
                    Some(TileType::Grass)
                );
                assert!(!map.is_collision_at(x, y));
            }
        }
    }

    #[test]
    fn test_room_based_level_has_spawn_at_center() {
        let generator = ready_generator(&rich_manifest());
        let config = GenerationConfig::new(0, 0, 32).with_seed(5).room(640, 360);
        let level = generator.generate(&config).unwrap();
        assert_eq!(level.tilemap.width(), 19);
        assert_eq!(level.tilemap.height(), 11);
        let spawn = level.entities_of_kind("player_spawn").next().unwrap();
        assert_eq!((spawn.x, spawn.y), (9.0 * 32.0, 5.0 * 32.0));
        assert!(!level.tilemap.is_collision_at(9, 5));
    }

    #[test]
    fn test_failed_fetch_keeps_tile_ids() {
        let generator = ready_generator(&[
            "Tiles/Terrains/Grass.png",
            "Tiles/Terrains/MissingWall.png",
        ]);
        let atlas = generator.atlas().unwrap();
        assert_eq!(atlas.layout.count, 2);
        assert_eq!(atlas.missing, vec![2]);
        assert_eq!(generator.tile_type_of(2), Some(TileType::Wall));

        let level = generator
            .generate(&GenerationConfig::new(5, 5, 16).with_seed(1))
            .unwrap();
        assert_eq!(level.tilemap.get_tile_at(TERRAIN, 0, 0), 2);
        let tileset = level.tilemap.tileset.as_ref().unwrap();
        assert_eq!(tileset.tile_count, 2);
    }

    #[test]
    fn test_is_ready_eventually_true() {
        let mut generator = WorldGenerator::new(Arc::new(BlankFetcher), 4);
        generator.begin_initialize(&paths(&["Tiles/Terrains/Grass.png"]), 16);
        assert_ne!(generator.state(), GeneratorState::Uninitialized);
        generator.wait_ready().unwrap();
        assert!(generator.is_ready());
        assert_eq!(generator.state(), GeneratorState::Initialized);
    }
}
