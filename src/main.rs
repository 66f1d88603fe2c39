//! tilerealm command line.
//!
//! - `generate` builds a level from a directory of PNG tiles and writes the
//!   level JSON plus its packed atlas next to it.
//! - `simulate` loads a level and runs it headless for a number of frames
//!   while holding "right", logging the player position.
//!
//! ```sh
//! tilerealm generate --assets assets/tiles --seed 42 --out level.json
//! RUST_LOG=debug tilerealm simulate --level level.json --frames 120
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};

use tilerealm::components::transform::Transform;
use tilerealm::error::EngineResult;
use tilerealm::game::Game;
use tilerealm::resources::gameconfig::GameConfig;
use tilerealm::resources::input::{InputSnapshot, Key};
use tilerealm::resources::level::Level;
use tilerealm::worldgen::WorldGenerator;
use tilerealm::worldgen::atlas::FsImageFetcher;

/// tilerealm 2D tile engine
#[derive(Parser)]
#[command(version, about = "Procedural tile levels and a headless simulation core")]
struct Cli {
    /// INI configuration file. Defaults apply to missing keys.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a level from an asset directory.
    Generate {
        /// Directory scanned recursively for .png tiles.
        #[arg(long, value_name = "DIR")]
        assets: PathBuf,
        /// Fixed seed; overrides the config file.
        #[arg(long)]
        seed: Option<u32>,
        /// Level JSON output. The atlas is written beside it as .png.
        #[arg(long, value_name = "PATH", default_value = "level.json")]
        out: PathBuf,
    },
    /// Run a level headless.
    Simulate {
        #[arg(long, value_name = "PATH")]
        level: PathBuf,
        #[arg(long, default_value_t = 120)]
        frames: u32,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Generate { assets, seed, out } => generate(config, &assets, seed, &out),
        Command::Simulate { level, frames } => simulate(config, &level, frames),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> EngineResult<GameConfig> {
    match path {
        Some(path) => {
            let mut config = GameConfig::with_path(path);
            config.load_from_file()?;
            Ok(config)
        }
        None => Ok(GameConfig::new()),
    }
}

/// PNG paths under `root`, relative to it, `/`-separated and sorted so the
/// manifest is stable across platforms.
fn collect_pngs(root: &Path) -> EngineResult<Vec<String>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
                && let Ok(relative) = path.strip_prefix(root)
            {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                found.push(parts.join("/"));
            }
        }
    }
    found.sort();
    Ok(found)
}

fn generate(config: GameConfig, assets: &Path, seed: Option<u32>, out: &Path) -> EngineResult<()> {
    let paths = collect_pngs(assets)?;
    info!("Found {} tiles under {}", paths.len(), assets.display());

    let mut generator = WorldGenerator::new(
        Arc::new(FsImageFetcher::new(assets)),
        config.atlas_tile_size,
    );
    generator.initialize(&paths, config.max_assets)?;

    let mut generation = config.generation.clone();
    if seed.is_some() {
        generation.seed = seed;
    }
    let mut level = generator.generate(&generation)?;

    let atlas_path = out.with_extension("png");
    if let Some(atlas) = generator.atlas() {
        atlas.save(&atlas_path)?;
        let file_name = atlas_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(tileset) = level.tilemap.tileset.as_mut() {
            tileset.image_path = file_name;
        }
        info!("Atlas written to {}", atlas_path.display());
    }
    level.save(out)
}

fn simulate(config: GameConfig, level_path: &Path, frames: u32) -> EngineResult<()> {
    let level = Level::load(level_path)?;
    let dt = config.frame_delta();
    let mut game = Game::new(config);
    game.load_level(level)?;

    let input = InputSnapshot::with_keys(&[Key::D]);
    for frame in 1..=frames {
        game.tick(dt, &input);
        if frame % 60 == 0 || frame == frames {
            let position = game
                .player()
                .and_then(|id| game.store().get::<Transform>(id))
                .map(|t| t.position);
            info!("frame {}: player at {:?}", frame, position);
        }
    }
    Ok(())
}
