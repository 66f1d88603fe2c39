//! Game configuration resource.
//!
//! Manages settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 640
//! height = 360
//! target_fps = 60
//!
//! [generation]
//! width = 32
//! height = 32
//! tile_size = 32
//! seed = 42
//! terrain_density = 0.8
//! structure_density = 0.3
//! room_based = false
//! max_assets = 256
//! atlas_tile_size = 32
//!
//! [camera]
//! smoothing = 0.15
//! zoom = 1.0
//!
//! [physics]
//! acceleration = 800
//! max_speed = 200
//! friction = 0.85
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};
use crate::worldgen::config::GenerationConfig;

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 640;
const DEFAULT_WINDOW_HEIGHT: u32 = 360;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_MAX_ASSETS: usize = 256;
const DEFAULT_ATLAS_TILE_SIZE: u32 = 32;
const DEFAULT_CAMERA_SMOOTHING: f32 = 0.15;
const DEFAULT_CAMERA_ZOOM: f32 = 1.0;
const DEFAULT_ACCELERATION: f32 = 800.0;
const DEFAULT_MAX_SPEED: f32 = 200.0;
const DEFAULT_FRICTION: f32 = 0.85;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Screen width in pixels.
    pub window_width: u32,
    /// Screen height in pixels.
    pub window_height: u32,
    /// Fixed simulation rate used by headless runs.
    pub target_fps: u32,
    pub generation: GenerationConfig,
    /// Manifest size above which the generator down-samples.
    pub max_assets: usize,
    /// Pixel size of one atlas cell.
    pub atlas_tile_size: u32,
    pub camera_smoothing: f32,
    pub camera_zoom: f32,
    /// Movement defaults for spawned players.
    pub player_acceleration: f32,
    pub player_max_speed: f32,
    pub player_friction: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            generation: GenerationConfig::default(),
            max_assets: DEFAULT_MAX_ASSETS,
            atlas_tile_size: DEFAULT_ATLAS_TILE_SIZE,
            camera_smoothing: DEFAULT_CAMERA_SMOOTHING,
            camera_zoom: DEFAULT_CAMERA_ZOOM,
            player_acceleration: DEFAULT_ACCELERATION,
            player_max_speed: DEFAULT_MAX_SPEED,
            player_friction: DEFAULT_FRICTION,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| EngineError::Config(format!("Failed to load config file: {}", e)))?;
        self.apply_ini(&config);

        info!(
            "Loaded config: {}x{} window, fps={}, generation {}x{} tile={} seed={:?}",
            self.window_width,
            self.window_height,
            self.target_fps,
            self.generation.width,
            self.generation.height,
            self.generation.tile_size,
            self.generation.seed
        );

        Ok(())
    }

    /// Parse configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;
        self.apply_ini(&config);
        Ok(())
    }

    fn apply_ini(&mut self, config: &Ini) {
        let uint = |section: &str, key: &str| config.getuint(section, key).ok().flatten();
        let float = |section: &str, key: &str| config.getfloat(section, key).ok().flatten();
        let boolean = |section: &str, key: &str| config.getbool(section, key).ok().flatten();

        // [window] section
        if let Some(width) = uint("window", "width") {
            self.window_width = width as u32;
        }
        if let Some(height) = uint("window", "height") {
            self.window_height = height as u32;
        }
        if let Some(fps) = uint("window", "target_fps") {
            self.target_fps = fps as u32;
        }

        // [generation] section
        let generation = &mut self.generation;
        if let Some(width) = uint("generation", "width") {
            generation.width = width as u32;
        }
        if let Some(height) = uint("generation", "height") {
            generation.height = height as u32;
        }
        if let Some(tile_size) = uint("generation", "tile_size") {
            generation.tile_size = tile_size as u32;
        }
        if let Some(seed) = uint("generation", "seed") {
            generation.seed = Some(seed as u32);
        }
        if let Some(density) = float("generation", "terrain_density") {
            generation.terrain_density = density as f32;
        }
        if let Some(density) = float("generation", "structure_density") {
            generation.structure_density = density as f32;
        }
        if let Some(room_based) = boolean("generation", "room_based") {
            generation.room_based = room_based;
            if room_based {
                generation.screen_width = Some(self.window_width);
                generation.screen_height = Some(self.window_height);
            }
        }
        if let Some(max_assets) = uint("generation", "max_assets") {
            self.max_assets = max_assets as usize;
        }
        if let Some(size) = uint("generation", "atlas_tile_size") {
            self.atlas_tile_size = size as u32;
        }

        // [camera] section
        if let Some(smoothing) = float("camera", "smoothing") {
            self.camera_smoothing = smoothing as f32;
        }
        if let Some(zoom) = float("camera", "zoom") {
            self.camera_zoom = zoom as f32;
        }

        // [physics] section
        if let Some(acceleration) = float("physics", "acceleration") {
            self.player_acceleration = acceleration as f32;
        }
        if let Some(max_speed) = float("physics", "max_speed") {
            self.player_max_speed = max_speed as f32;
        }
        if let Some(friction) = float("physics", "friction") {
            self.player_friction = friction as f32;
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> EngineResult<()> {
        let mut config = Ini::new();

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        // [generation] section
        let g = &self.generation;
        config.set("generation", "width", Some(g.width.to_string()));
        config.set("generation", "height", Some(g.height.to_string()));
        config.set("generation", "tile_size", Some(g.tile_size.to_string()));
        if let Some(seed) = g.seed {
            config.set("generation", "seed", Some(seed.to_string()));
        }
        config.set("generation", "terrain_density", Some(g.terrain_density.to_string()));
        config.set(
            "generation",
            "structure_density",
            Some(g.structure_density.to_string()),
        );
        config.set("generation", "room_based", Some(g.room_based.to_string()));
        config.set("generation", "max_assets", Some(self.max_assets.to_string()));
        config.set(
            "generation",
            "atlas_tile_size",
            Some(self.atlas_tile_size.to_string()),
        );

        // [camera] section
        config.set("camera", "smoothing", Some(self.camera_smoothing.to_string()));
        config.set("camera", "zoom", Some(self.camera_zoom.to_string()));

        // [physics] section
        config.set("physics", "acceleration", Some(self.player_acceleration.to_string()));
        config.set("physics", "max_speed", Some(self.player_max_speed.to_string()));
        config.set("physics", "friction", Some(self.player_friction.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| EngineError::Config(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Fixed frame delta derived from `target_fps`.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}
