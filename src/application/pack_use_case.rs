// ============================================================
// Layer 2 — PackUseCase
// ============================================================
// Turns directories of images into packed `.npy` arrays:
//
//   Step 1: List the first directory      (Layer 4 - data)
//   Step 2: Sample the training names     (Layer 4 - data)
//   Step 3: Pack every directory          (Layer 4 - data)
//
// All directories are packed with the same file names, so an
// input directory and its aligned target directory end up with
// identical train/test splits.
//
//   glyphs_x/  ──┐                     glyphs_x_train.npy  glyphs_x_test.npy
//                ├─ one shared split →
//   glyphs_y/  ──┘                     glyphs_y_train.npy  glyphs_y_test.npy

use anyhow::{ensure, Result};
use std::path::PathBuf;

use crate::data::{
    image_dir::ImageDir,
    packer::{decode_to_array, save_packed},
    sampler::{sample_without_replacement, seeded_rng, DEFAULT_SEED},
};
use crate::domain::{split::Split, traits::ImageSource};

#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Source directories; the first one drives the split
    pub dirs:        Vec<PathBuf>,
    /// Images sampled into `_train`; `None` packs everything to `_test`
    pub train_count: Option<usize>,
    pub seed:        u64,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self { dirs: Vec::new(), train_count: None, seed: DEFAULT_SEED }
    }
}

pub struct PackUseCase {
    config: PackConfig,
}

impl PackUseCase {
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    /// Returns the paths of every array written.
    pub fn execute(&self) -> Result<Vec<PathBuf>> {
        let cfg = &self.config;
        ensure!(!cfg.dirs.is_empty(), "No directories to pack");

        let sources: Vec<ImageDir> = cfg.dirs.iter().cloned().map(ImageDir::new).collect();

        // ── Step 1: Listing ──────────────────────────────────────────────────
        let mut pool = sources[0].list_entries()?;
        tracing::info!("Found {} entries in '{}'", pool.len(), sources[0].describe());

        // ── Step 2: Split ────────────────────────────────────────────────────
        let mut splits: Vec<(Split, Vec<String>)> = Vec::with_capacity(2);
        match cfg.train_count {
            Some(count) => {
                let mut rng = seeded_rng(cfg.seed);
                let train   = sample_without_replacement(&mut pool, count, &mut rng)?;
                tracing::info!("Split: {} train, {} test (seed {})", train.len(), pool.len(), cfg.seed);
                splits.push((Split::Train, train));
                splits.push((Split::Test, pool));
            }
            None => {
                tracing::info!("No train count given; packing all {} entries as test", pool.len());
                splits.push((Split::Test, pool));
            }
        }

        // ── Step 3: Pack ─────────────────────────────────────────────────────
        let mut written = Vec::new();
        for source in &sources {
            for (split, names) in &splits {
                if names.is_empty() {
                    tracing::warn!("No {} entries for '{}'; skipped", split, source.describe());
                    continue;
                }
                let array = decode_to_array(source, names)?;
                let path  = split.packed_path(source.path());
                save_packed(&path, &array)?;
                written.push(path);
            }
        }
        Ok(written)
    }
}
