// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network code lives here:
//
//   layers.rs        — conv blocks, "same" padding, upsampling
//   generator.rs     — U-Net generator
//   discriminator.rs — PatchGAN discriminator
//   trainer.rs       — the two update procedures and the loop
//   inferencer.rs    — checkpoint loading and translation
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

use burn::backend::{Autodiff, Wgpu};

/// Backend used for training runs
pub type TrainBackend = Autodiff<Wgpu>;

/// Backend used for inference runs
pub type InferBackend = Wgpu;

/// Conv blocks shared by both networks
pub mod layers;

/// U-Net generator
pub mod generator;

/// Patch-grid discriminator
pub mod discriminator;

/// Adversarial training loop with checkpointing and sampling
pub mod trainer;

/// Loads a checkpoint and translates images
pub mod inferencer;
