// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the generator from the saved training config, loads
// its weights and translates a fixed set of images.

use anyhow::{ensure, Result};
use burn::prelude::*;

use crate::data::{
    batcher::{tensor_to_planes, PairBatcher},
    dataset::ImageStack,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::generator::Generator;
use crate::application::train_use_case::TrainConfig;

pub struct Inferencer<B: Backend> {
    model:   Generator<B>,
    config:  TrainConfig,
    batcher: PairBatcher<B>,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: &B::Device) -> Result<Self> {
        let config = ckpt_manager.load_config()?;
        let model  = config.generator_config().init::<B>(device);
        let model  = ckpt_manager.load_generator(model, device)?;
        tracing::info!(
            "Generator loaded from '{}' ({}x{}x{})",
            ckpt_manager.dir().display(),
            config.channels, config.img_rows, config.img_cols
        );
        let batcher = PairBatcher::new(device.clone(), config.image_shape());
        Ok(Self { model, config, batcher })
    }

    /// Translate the images at `indices` of `stack`.
    /// Returns flat `[N, C, H, W]` values in [-1, 1] and their dims.
    pub fn translate(&self, stack: &ImageStack, indices: &[usize]) -> Result<(Vec<f32>, [usize; 4])> {
        ensure!(!indices.is_empty(), "No image indices given");
        stack.ensure_shape(self.config.image_shape(), "Inference")?;

        let inputs = stack.select(indices)?;
        let output = self.model.forward(self.batcher.images(&inputs));
        tensor_to_planes(output)
    }
}
