//! Texture atlas packing on a background thread.
//!
//! [`AtlasLoader::spawn`] fetches every sampled image through an
//! [`ImageFetcher`] on a dedicated thread and packs them row-major into one
//! RGBA image. The result comes back over a bounded channel; the generator
//! polls it with [`AtlasLoader::poll`] or blocks on [`AtlasLoader::wait`].

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, TryRecvError, bounded};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use log::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::geometry::Rect;
use crate::resources::tilemap::Tileset;

/// Source of decoded images, keyed by manifest path.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, path: &str) -> EngineResult<DynamicImage>;
}

/// Reads images from disk relative to `root`.
#[derive(Debug, Clone)]
pub struct FsImageFetcher {
    root: PathBuf,
}

impl FsImageFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageFetcher for FsImageFetcher {
    fn fetch(&self, path: &str) -> EngineResult<DynamicImage> {
        image::open(self.root.join(path)).map_err(|e| EngineError::AssetLoad {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Grid geometry of a packed atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLayout {
    pub tile_size: u32,
    pub columns: u32,
    pub rows: u32,
    pub count: u32,
}

impl AtlasLayout {
    /// Near-square grid holding `count` tiles.
    pub fn for_count(count: u32, tile_size: u32) -> Self {
        let columns = ((count as f64).sqrt().ceil() as u32).max(1);
        let rows = count.div_ceil(columns).max(1);
        Self {
            tile_size,
            columns,
            rows,
            count,
        }
    }

    /// Layout described by a persisted tileset.
    pub fn from_tileset(tileset: &Tileset) -> Self {
        let columns = tileset.columns.max(1);
        Self {
            tile_size: tileset.tile_width,
            columns,
            rows: tileset.tile_count.div_ceil(columns).max(1),
            count: tileset.tile_count,
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.columns * self.tile_size, self.rows * self.tile_size)
    }

    /// Pixel rectangle of tile `id` (1-based). `None` for 0 and unknown ids.
    pub fn source_rect(&self, id: u32) -> Option<Rect> {
        if id == 0 || id > self.count {
            return None;
        }
        let index = id - 1;
        let ts = self.tile_size as f32;
        Some(Rect::new(
            (index % self.columns) as f32 * ts,
            (index / self.columns) as f32 * ts,
            ts,
            ts,
        ))
    }
}

/// A packed atlas and the slots that failed to load.
#[derive(Debug, Clone)]
pub struct Atlas {
    pub image: RgbaImage,
    pub layout: AtlasLayout,
    /// Tile ids whose image could not be fetched. Their slots stay blank.
    pub missing: Vec<u32>,
}

impl Atlas {
    pub fn tileset(&self, name: &str, image_path: &str) -> Tileset {
        Tileset {
            name: name.to_string(),
            image_path: image_path.to_string(),
            tile_width: self.layout.tile_size,
            tile_height: self.layout.tile_size,
            tile_count: self.layout.count,
            columns: self.layout.columns,
        }
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> EngineResult<()> {
        self.image.save(path.as_ref()).map_err(|e| EngineError::AssetLoad {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Fetch and pack `paths` in order. Tile `i + 1` holds `paths[i]`.
pub fn pack_atlas(fetcher: &dyn ImageFetcher, paths: &[String], tile_size: u32) -> Atlas {
    let layout = AtlasLayout::for_count(paths.len() as u32, tile_size);
    let (w, h) = layout.pixel_size();
    let mut image = RgbaImage::new(w, h);
    let mut missing = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        let id = index as u32 + 1;
        let tile = match fetcher.fetch(path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                warn!("Atlas slot {} left blank: {}", id, e);
                missing.push(id);
                continue;
            }
        };
        let tile = if tile.dimensions() == (tile_size, tile_size) {
            tile
        } else {
            imageops::resize(&tile, tile_size, tile_size, FilterType::Nearest)
        };
        if let Some(rect) = layout.source_rect(id) {
            imageops::replace(&mut image, &tile, rect.x as i64, rect.y as i64);
        }
    }

    debug!(
        "Packed {} tiles into {}x{} atlas ({} missing)",
        paths.len(),
        w,
        h,
        missing.len()
    );
    Atlas {
        image,
        layout,
        missing,
    }
}

/// Handle to an atlas being packed on a background thread.
pub struct AtlasLoader {
    rx: Receiver<Atlas>,
    handle: Option<JoinHandle<()>>,
    result: Option<Atlas>,
}

impl AtlasLoader {
    pub fn spawn(fetcher: Arc<dyn ImageFetcher>, paths: Vec<String>, tile_size: u32) -> Self {
        let (tx, rx) = bounded::<Atlas>(1);
        let handle = std::thread::spawn(move || {
            let atlas = pack_atlas(fetcher.as_ref(), &paths, tile_size);
            // Receiver gone means the generator was dropped mid-load.
            let _ = tx.send(atlas);
        });
        info!("Atlas loader started");
        Self {
            rx,
            handle: Some(handle),
            result: None,
        }
    }

    /// Non-blocking readiness check.
    pub fn poll(&mut self) -> EngineResult<bool> {
        if self.result.is_some() {
            return Ok(true);
        }
        match self.rx.try_recv() {
            Ok(atlas) => {
                self.finish(atlas);
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(self.loader_died()),
        }
    }

    /// Block until the atlas is packed.
    pub fn wait(&mut self) -> EngineResult<&Atlas> {
        if self.result.is_none() {
            let atlas = self.rx.recv().map_err(|_| self.loader_died())?;
            self.finish(atlas);
        }
        self.result.as_ref().ok_or_else(|| self.loader_died())
    }

    pub fn atlas(&self) -> Option<&Atlas> {
        self.result.as_ref()
    }

    fn finish(&mut self, atlas: Atlas) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        info!(
            "Atlas ready: {} tiles, {} columns",
            atlas.layout.count, atlas.layout.columns
        );
        self.result = Some(atlas);
    }

    fn loader_died(&self) -> EngineError {
        EngineError::AssetLoad {
            path: "<atlas>".to_string(),
            reason: "atlas loader thread exited without a result".to_string(),
        }
    }
}

/// Renderer-facing atlas readiness. Until `ready` is set, tiles draw as flat
/// fallback rectangles.
#[derive(Resource, Debug, Clone, Default)]
pub struct AtlasImage {
    /// Image key the renderer resolves to its texture.
    pub key: String,
    pub layout: Option<AtlasLayout>,
    pub ready: bool,
}

impl AtlasImage {
    pub fn ready(key: impl Into<String>, layout: AtlasLayout) -> Self {
        Self {
            key: key.into(),
            layout: Some(layout),
            ready: true,
        }
    }

    pub fn source_rect(&self, id: u32) -> Option<Rect> {
        if !self.ready {
            return None;
        }
        self.layout.and_then(|l| l.source_rect(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    struct SolidFetcher;

    impl ImageFetcher for SolidFetcher {
        fn fetch(&self, path: &str) -> EngineResult<DynamicImage> {
            if path.contains("broken") {
                return Err(EngineError::AssetLoad {
                    path: path.to_string(),
                    reason: "corrupt".to_string(),
                });
            }
            let mut img = RgbaImage::new(4, 4);
            for p in img.pixels_mut() {
                *p = Rgba([255, 0, 0, 255]);
            }
            Ok(DynamicImage::ImageRgba8(img))
        }
    }

    #[test]
    fn test_layout_is_near_square() {
        let l = AtlasLayout::for_count(5, 8);
        assert_eq!((l.columns, l.rows), (3, 2));
        assert_eq!(l.source_rect(4), Some(Rect::new(0.0, 8.0, 8.0, 8.0)));
        assert_eq!(l.source_rect(0), None);
        assert_eq!(l.source_rect(6), None);
    }

    #[test]
    fn test_pack_leaves_missing_slots_blank() {
        let paths = vec!["a.png".to_string(), "broken.png".to_string(), "c.png".to_string()];
        let atlas = pack_atlas(&SolidFetcher, &paths, 8);
        assert_eq!(atlas.missing, vec![2]);
        assert_eq!(atlas.image.dimensions(), (16, 16));
        // slot 1 is resized to 8x8 red, slot 2 stays transparent
        assert_eq!(atlas.image.get_pixel(7, 7), &Rgba([255, 0, 0, 255]));
        assert_eq!(atlas.image.get_pixel(8, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(atlas.image.get_pixel(0, 8), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_loader_reports_ready() {
        let paths = vec!["a.png".to_string()];
        let mut loader = AtlasLoader::spawn(Arc::new(SolidFetcher), paths, 4);
        let atlas = loader.wait().unwrap();
        assert_eq!(atlas.layout.count, 1);
        assert!(loader.poll().unwrap());
    }

    #[test]
    fn test_atlas_image_not_ready_has_no_regions() {
        let img = AtlasImage::default();
        assert_eq!(img.source_rect(1), None);
        let img = AtlasImage::ready("atlas", AtlasLayout::for_count(1, 16));
        assert!(img.source_rect(1).is_some());
    }
}
