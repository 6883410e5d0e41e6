// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the config         (Layer 2)
//   Step 2: Load packed arrays          (Layer 4 - data)
//   Step 3: Pair inputs with targets    (Layer 4 - data)
//   Step 4: Save config                 (Layer 6 - infra)
//   Step 5: Open metrics + sample sheet (Layer 6 - infra)
//   Step 6: Run the adversarial loop    (Layer 5 - ml)
//
// Training in the opposite direction is only a matter of
// swapping the input and target array paths.
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    dataset::{ImageShape, ImageStack, PairedDataset},
    packer::load_packed,
    rasterizer::GlyphFont,
    sampler::DEFAULT_SEED,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    sample_sheet::SampleSheet,
};
use crate::ml::{
    discriminator::DiscriminatorConfig,
    generator::{GeneratorConfig, GENERATOR_DEPTH},
    trainer::{run_training, LossWeights, TrainingData},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters and paths for a training run.
// Saved next to the checkpoints so inference can rebuild the
// generator with the same architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Conditioning images for training
    pub input_train:        String,
    /// Ground truth for training, aligned with `input_train`
    pub target_train:       String,
    pub input_test:         String,
    pub target_test:        String,
    pub checkpoint_dir:     String,
    pub images_dir:         String,
    /// Sub-directory of `images_dir` for this run's sample sheets
    pub dataset_name:       String,
    pub img_rows:           usize,
    pub img_cols:           usize,
    pub channels:           usize,
    pub gf:                 usize,
    pub df:                 usize,
    pub epochs:             usize,
    pub batch_size:         usize,
    pub sample_interval:    usize,
    pub model_interval:     usize,
    pub lr:                 f64,
    pub beta_1:             f64,
    /// Drives batch selection and sample-sheet picks
    pub seed:               u64,
    pub adversarial_weight: f64,
    pub pixel_weight:       f64,
    /// Font used to title sample sheets
    pub label_font:         Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            input_train:        "data/y_train.npy".to_string(),
            target_train:       "data/x_train.npy".to_string(),
            input_test:         "data/y_test.npy".to_string(),
            target_test:        "data/x_test.npy".to_string(),
            checkpoint_dir:     "models".to_string(),
            images_dir:         "images".to_string(),
            dataset_name:       "pix2pix_64".to_string(),
            img_rows:           64,
            img_cols:           64,
            channels:           1,
            gf:                 64,
            df:                 64,
            epochs:             5,
            batch_size:         1,
            sample_interval:    200,
            model_interval:     500,
            lr:                 2e-4,
            beta_1:             0.5,
            seed:               DEFAULT_SEED,
            adversarial_weight: 1.0,
            pixel_weight:       100.0,
            label_font:         None,
        }
    }
}

impl TrainConfig {
    pub fn image_shape(&self) -> ImageShape {
        ImageShape::new(self.channels, self.img_rows, self.img_cols)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.channels).with_filters(self.gf)
    }

    pub fn discriminator_config(&self) -> DiscriminatorConfig {
        DiscriminatorConfig::new(self.channels).with_filters(self.df)
    }

    pub fn loss_weights(&self) -> LossWeights {
        LossWeights {
            adversarial: self.adversarial_weight,
            pixel:       self.pixel_weight,
        }
    }

    /// `<images_dir>/<dataset_name>/<epoch>_<batch>.png`
    pub fn sample_path(&self, epoch: usize, batch: usize) -> PathBuf {
        Path::new(&self.images_dir)
            .join(&self.dataset_name)
            .join(format!("{epoch}_{batch}.png"))
    }

    /// Reject settings the networks or the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        let multiple = 1 << GENERATOR_DEPTH;
        ensure!(
            self.img_rows > 0 && self.img_cols > 0
                && self.img_rows % multiple == 0
                && self.img_cols % multiple == 0,
            "Image size {}x{} must be a positive multiple of {}",
            self.img_rows, self.img_cols, multiple
        );
        ensure!(
            self.channels == 1 || self.channels == 3,
            "channels must be 1 (grayscale) or 3 (RGB), got {}",
            self.channels
        );
        ensure!(self.gf > 0 && self.df > 0, "gf and df must be at least 1");
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(
            self.sample_interval > 0 && self.model_interval > 0,
            "sample_interval and model_interval must be at least 1"
        );
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Steps 2-3: Load and pair ──────────────────────────────────────────
        let data = self.load_data()?;

        // ── Step 4: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 5: Outputs ───────────────────────────────────────────────────
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        let font    = cfg
            .label_font
            .as_deref()
            .map(|p| GlyphFont::from_file(Path::new(p)))
            .transpose()?;
        let sheet   = SampleSheet::new(font);

        // ── Step 6: Train (Layer 5) ───────────────────────────────────────────
        run_training(cfg, data, &ckpt_manager, &metrics, &sheet)?;

        tracing::info!("Metrics written to '{}'", metrics.csv_path().display());
        Ok(())
    }

    /// Load both pairs of arrays and check them against the
    /// configured image shape.
    pub fn load_data(&self) -> Result<TrainingData> {
        let cfg   = &self.config;
        let shape = cfg.image_shape();

        let train = load_pair(&cfg.input_train, &cfg.target_train)?;
        let test  = load_pair(&cfg.input_test, &cfg.target_test)?;
        train.inputs().ensure_shape(shape, "Training")?;
        test.inputs().ensure_shape(shape, "Test")?;

        tracing::info!("Loaded {} training pairs, {} test pairs", train.len(), test.len());
        Ok(TrainingData { train, test })
    }
}

fn load_pair(input: &str, target: &str) -> Result<PairedDataset> {
    let input  = ImageStack::from_packed(&load_packed(Path::new(input))?)?;
    let target = ImageStack::from_packed(&load_packed(Path::new(target))?)?;
    PairedDataset::new(input, target)
}
