// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// File layout (fixed names, overwritten on every save):
//
//   models/
//     generator.*            ← generator weights
//     discriminator.*        ← discriminator weights
//     train_config.json      ← architecture and hyperparameters
//
// The recorder picks the extension. Loading into a model of a
// different architecture fails, so inference always rebuilds
// the generator from train_config.json first.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::{discriminator::Discriminator, generator::Generator};

const GENERATOR_FILE:     &str = "generator";
const DISCRIMINATOR_FILE: &str = "discriminator";
const CONFIG_FILE:        &str = "train_config.json";

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        // A failure here resurfaces with context on the first save
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite both models' weight files.
    pub fn save_models<B: Backend>(
        &self,
        generator:     &Generator<B>,
        discriminator: &Discriminator<B>,
    ) -> Result<()> {
        self.save_module(generator, GENERATOR_FILE)?;
        self.save_module(discriminator, DISCRIMINATOR_FILE)?;
        tracing::debug!("Saved generator and discriminator to '{}'", self.dir.display());
        Ok(())
    }

    /// Restore generator weights onto a freshly built generator.
    pub fn load_generator<B: Backend>(
        &self,
        model:  Generator<B>,
        device: &B::Device,
    ) -> Result<Generator<B>> {
        self.load_module(model, GENERATOR_FILE, device)
    }

    fn save_module<B: Backend, M: Module<B>>(&self, module: &M, name: &str) -> Result<()> {
        // The recorder appends its own extension
        let path = self.dir.join(name);
        CompactRecorder::new()
            .record(module.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        Ok(())
    }

    fn load_module<B: Backend, M: Module<B>>(
        &self,
        module: M,
        name:   &str,
        device: &B::Device,
    ) -> Result<M> {
        let path = self.dir.join(name);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;
        tracing::info!("Loaded weights from '{}'", path.display());
        Ok(module.load_record(record))
    }

    /// Save the training configuration to JSON.
    ///
    /// Must run before training starts so inference can rebuild
    /// the exact architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'infer'.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed training config '{}'", path.display()))
    }
}
