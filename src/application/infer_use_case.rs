// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Runs a trained generator over a few images of a packed array:
//
//   Step 1: Rebuild + load the generator   (Layer 5 - ml)
//   Step 2: Load the input array           (Layer 4 - data)
//   Step 3: Translate the chosen indices   (Layer 5 - ml)
//   Step 4: Render one "Generated" row     (Layer 6 - infra)

use anyhow::Result;
use burn::prelude::*;
use std::path::{Path, PathBuf};

use crate::data::{dataset::ImageStack, packer::load_packed, rasterizer::GlyphFont};
use crate::infra::{
    checkpoint::CheckpointManager,
    sample_sheet::{planes_to_images, SampleSheet, SheetRow},
};
use crate::ml::{inferencer::Inferencer, InferBackend};

#[derive(Debug, Clone)]
pub struct InferConfig {
    pub checkpoint_dir: String,
    /// Packed conditioning images
    pub input:          String,
    pub indices:        Vec<usize>,
    /// Where the PNG row is written
    pub output:         String,
    pub label_font:     Option<String>,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "models".to_string(),
            input:          "data/y_test.npy".to_string(),
            indices:        vec![0, 1, 2, 3],
            output:         "images/inference.png".to_string(),
            label_font:     None,
        }
    }
}

pub struct InferUseCase {
    config: InferConfig,
}

impl InferUseCase {
    pub fn new(config: InferConfig) -> Self {
        Self { config }
    }

    /// Translate on the GPU and return the written image path.
    pub fn execute(&self) -> Result<PathBuf> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.run::<InferBackend>(&device)
    }

    pub fn run<B: Backend>(&self, device: &B::Device) -> Result<PathBuf> {
        let cfg = &self.config;

        // ── Step 1: Generator ─────────────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        let inferencer   = Inferencer::<B>::from_checkpoint(&ckpt_manager, device)?;

        // ── Step 2: Inputs ────────────────────────────────────────────────────
        let stack = ImageStack::from_packed(&load_packed(Path::new(&cfg.input))?)?;

        // ── Step 3: Translate ─────────────────────────────────────────────────
        let (values, dims) = inferencer.translate(&stack, &cfg.indices)?;

        // ── Step 4: Render ────────────────────────────────────────────────────
        let font = cfg
            .label_font
            .as_deref()
            .map(|p| GlyphFont::from_file(Path::new(p)))
            .transpose()?;
        let output = PathBuf::from(&cfg.output);
        SampleSheet::new(font).save(
            &[SheetRow::new("Generated", planes_to_images(&values, dims)?)],
            &output,
        )?;

        tracing::info!("Translated {} images into '{}'", dims[0], output.display());
        Ok(output)
    }
}
