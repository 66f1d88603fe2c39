//! Asset manifest parsing and down-sampling.

use std::path::Path;
use std::sync::OnceLock;

use rustc_hash::FxHashSet;

use super::classifier::{classify, TileType};
use super::rng::Lcg;

/// One image from the asset manifest.
#[derive(Debug, Clone)]
pub struct WorldAsset {
    pub path: String,
    /// Name of the parent directory.
    pub category: String,
    /// File name without extension.
    pub name: String,
    tile_type: OnceLock<TileType>,
}

impl WorldAsset {
    pub fn new(
        path: impl Into<String>,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            category: category.into(),
            name: name.into(),
            tile_type: OnceLock::new(),
        }
    }

    /// Split a manifest path such as `Tiles/Terrains/Grass.png` into its
    /// category (`Terrains`) and name (`Grass`).
    pub fn parse_path(path: &str) -> Self {
        let p = Path::new(path);
        let name = p
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = p
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(path, category, name)
    }

    /// Classified on first access and cached.
    pub fn tile_type(&self) -> TileType {
        *self
            .tile_type
            .get_or_init(|| classify(&self.name, &self.category))
    }
}

/// Reduce `paths` to at most `max` entries.
///
/// Takes every `ceil(len / max)`-th path first, then tops up with distinct
/// unselected paths drawn from an LCG seeded with the manifest length. The
/// result keeps manifest order so atlas IDs are stable for a given manifest.
pub fn sample_manifest(paths: &[String], max: usize) -> Vec<String> {
    if max == 0 {
        return Vec::new();
    }
    if paths.len() <= max {
        return paths.to_vec();
    }
    let stride = paths.len().div_ceil(max);
    let mut picked: FxHashSet<usize> = (0..paths.len()).step_by(stride).collect();

    let mut rng = Lcg::new(paths.len() as u32);
    let mut remaining: Vec<usize> = (0..paths.len()).filter(|i| !picked.contains(i)).collect();
    while picked.len() < max && !remaining.is_empty() {
        let i = ((rng.next_f32() * remaining.len() as f32) as usize).min(remaining.len() - 1);
        picked.insert(remaining.swap_remove(i));
    }

    let mut indices: Vec<usize> = picked.into_iter().collect();
    indices.sort_unstable();
    indices.into_iter().map(|i| paths[i].clone()).collect()
}
