//! Generation parameters.

use serde::{Deserialize, Serialize};

/// Parameters for one [`WorldGenerator::generate`](super::WorldGenerator::generate) call.
///
/// Field names serialize in camelCase so the object matches the config
/// object accepted by level tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Width in tiles. Ignored when `room_based` is set with a screen size.
    pub width: u32,
    /// Height in tiles. Ignored when `room_based` is set with a screen size.
    pub height: u32,
    pub tile_size: u32,
    /// Fixed seed for reproducible output. `None` draws fresh entropy.
    pub seed: Option<u32>,
    /// Probability in `[0, 1]` that an interior cell gets a terrain tile.
    pub terrain_density: f32,
    /// Scales the number of structure placement attempts, in `[0, 1]`.
    pub structure_density: f32,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    /// Size the level to exactly fill one screen.
    pub room_based: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            tile_size: 32,
            seed: None,
            terrain_density: 0.8,
            structure_density: 0.3,
            screen_width: None,
            screen_height: None,
            room_based: false,
        }
    }
}

impl GenerationConfig {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            width,
            height,
            tile_size,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_densities(mut self, terrain: f32, structure: f32) -> Self {
        self.terrain_density = terrain;
        self.structure_density = structure;
        self
    }

    pub fn room(mut self, screen_width: u32, screen_height: u32) -> Self {
        self.screen_width = Some(screen_width);
        self.screen_height = Some(screen_height);
        self.room_based = true;
        self
    }

    /// Final map size in tiles.
    ///
    /// Room-based levels use `floor(screen / tile_size)`, stepped down to the
    /// nearest odd number so a center tile exists. Every result is at least 3
    /// so the map always has an interior.
    pub fn dimensions(&self) -> (u32, u32) {
        let tile = self.tile_size.max(1);
        let (w, h) = match (self.room_based, self.screen_width, self.screen_height) {
            (true, Some(sw), Some(sh)) => (to_odd(sw / tile), to_odd(sh / tile)),
            _ => (self.width, self.height),
        };
        (w.max(3), h.max(3))
    }

    pub fn terrain_density(&self) -> f32 {
        self.terrain_density.clamp(0.0, 1.0)
    }

    pub fn structure_density(&self) -> f32 {
        self.structure_density.clamp(0.0, 1.0)
    }
}

fn to_odd(n: u32) -> u32 {
    if n % 2 == 0 { n.saturating_sub(1) } else { n }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_dimensions_are_odd() {
        let cfg = GenerationConfig::new(0, 0, 32).room(640, 360);
        // 640/32 = 20 -> 19, 360/32 = 11 -> 11
        assert_eq!(cfg.dimensions(), (19, 11));
    }

    #[test]
    fn test_explicit_dimensions_without_room_flag() {
        let cfg = GenerationConfig::new(7, 9, 16);
        assert_eq!(cfg.dimensions(), (7, 9));
    }

    #[test]
    fn test_room_flag_without_screen_uses_explicit_size() {
        let mut cfg = GenerationConfig::new(10, 10, 16);
        cfg.room_based = true;
        assert_eq!(cfg.dimensions(), (10, 10));
    }

    #[test]
    fn test_densities_are_clamped() {
        let cfg = GenerationConfig::default().with_densities(1.5, -0.2);
        assert_eq!(cfg.terrain_density(), 1.0);
        assert_eq!(cfg.structure_density(), 0.0);
    }

    #[test]
    fn test_deserializes_camel_case_with_defaults() {
        let cfg: GenerationConfig =
            serde_json::from_str(r#"{"width":5,"height":5,"tileSize":16,"seed":7,"roomBased":false}"#)
                .unwrap();
        assert_eq!(cfg.tile_size, 16);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.terrain_density, 0.8);
    }
}
