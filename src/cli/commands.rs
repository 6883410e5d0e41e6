// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their flags:
//
//   rasterize  font + code point range  → one BMP per glyph
//   pack       image directories        → *_train.npy / *_test.npy
//   train      packed arrays            → checkpoints + sample sheets
//   infer      checkpoint + test array  → one PNG of translations
//
// Every `*Args` converts into an application-layer config, so
// the application layer never sees clap types.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    infer_use_case::InferConfig,
    pack_use_case::PackConfig,
    rasterize_use_case::RasterizeConfig,
    train_use_case::TrainConfig,
};
use crate::data::sampler::DEFAULT_SEED;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a range of code points to bitmap files
    Rasterize(RasterizeArgs),

    /// Pack image directories into .npy train/test arrays
    Pack(PackArgs),

    /// Train the pix2pix translator on packed arrays
    Train(TrainArgs),

    /// Translate a few test images with a trained generator
    Infer(InferArgs),
}

// ─── rasterize ────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct RasterizeArgs {
    /// TrueType/OpenType font to render with
    #[arg(long)]
    pub font: PathBuf,

    /// Directory receiving `<codepoint>.bmp` files
    #[arg(long, default_value = "data/glyphs")]
    pub output_dir: PathBuf,

    /// First code point: U+4E00, 0x4E00, 19968 or the character itself
    #[arg(long, default_value = "U+4E00", value_parser = parse_codepoint)]
    pub start: u32,

    /// Last code point, inclusive
    #[arg(long, default_value = "U+9F9F", value_parser = parse_codepoint)]
    pub end: u32,

    /// Glyph size in pixels per em
    #[arg(long, default_value_t = 32.0)]
    pub point_size: f32,

    /// Side of the square canvas in pixels
    #[arg(long, default_value_t = 32)]
    pub canvas: u32,
}

impl From<RasterizeArgs> for RasterizeConfig {
    fn from(a: RasterizeArgs) -> Self {
        RasterizeConfig {
            font_path:  a.font,
            output_dir: a.output_dir,
            start:      a.start,
            end:        a.end,
            point_size: a.point_size,
            canvas:     a.canvas,
        }
    }
}

/// Parse a code point written as `U+XXXX`, `0xXXXX`, a decimal
/// number, or a single character.
pub fn parse_codepoint(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let hex = s
        .strip_prefix("U+")
        .or_else(|| s.strip_prefix("u+"))
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"));

    if let Some(digits) = hex {
        return u32::from_str_radix(digits, 16).map_err(|e| format!("bad hex code point '{s}': {e}"));
    }
    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => Err(format!("'{s}' is neither a code point number nor a single character")),
    }
}

// ─── pack ─────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Image directory; repeat for aligned datasets that share one split
    #[arg(long = "dir", required = true)]
    pub dirs: Vec<PathBuf>,

    /// Images sampled into the training array; omit to pack all as test
    #[arg(long)]
    pub train_count: Option<usize>,

    /// Seed of the sampling generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl From<PackArgs> for PackConfig {
    fn from(a: PackArgs) -> Self {
        PackConfig {
            dirs:        a.dirs,
            train_count: a.train_count,
            seed:        a.seed,
        }
    }
}

// ─── train ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Conditioning images for training
    #[arg(long, default_value = "data/y_train.npy")]
    pub input_train: String,

    /// Ground truth for training, aligned with --input-train
    #[arg(long, default_value = "data/x_train.npy")]
    pub target_train: String,

    #[arg(long, default_value = "data/y_test.npy")]
    pub input_test: String,

    #[arg(long, default_value = "data/x_test.npy")]
    pub target_test: String,

    /// Directory for weights, train_config.json and metrics.csv
    #[arg(long, default_value = "models")]
    pub checkpoint_dir: String,

    #[arg(long, default_value = "images")]
    pub images_dir: String,

    /// Sample sheets go to <images-dir>/<dataset-name>/
    #[arg(long, default_value = "pix2pix_64")]
    pub dataset_name: String,

    /// Image height; must be a multiple of 32
    #[arg(long, default_value_t = 64)]
    pub img_rows: usize,

    /// Image width; must be a multiple of 32
    #[arg(long, default_value_t = 64)]
    pub img_cols: usize,

    #[arg(long, default_value_t = 1)]
    pub channels: usize,

    /// Filters in the first generator stage
    #[arg(long, default_value_t = 64)]
    pub gf: usize,

    /// Filters in the first discriminator stage
    #[arg(long, default_value_t = 64)]
    pub df: usize,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,

    /// Write a sample sheet every N batches
    #[arg(long, default_value_t = 200)]
    pub sample_interval: usize,

    /// Overwrite the checkpoints every N batches
    #[arg(long, default_value_t = 500)]
    pub model_interval: usize,

    #[arg(long, default_value_t = 2e-4)]
    pub lr: f64,

    /// Adam first-moment decay
    #[arg(long, default_value_t = 0.5)]
    pub beta_1: f64,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Weight of the adversarial term in the generator loss
    #[arg(long, default_value_t = 1.0)]
    pub adversarial_weight: f64,

    /// Weight of the L1 term in the generator loss
    #[arg(long, default_value_t = 100.0)]
    pub pixel_weight: f64,

    /// Font used to title sample sheets
    #[arg(long)]
    pub label_font: Option<String>,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            input_train:        a.input_train,
            target_train:       a.target_train,
            input_test:         a.input_test,
            target_test:        a.target_test,
            checkpoint_dir:     a.checkpoint_dir,
            images_dir:         a.images_dir,
            dataset_name:       a.dataset_name,
            img_rows:           a.img_rows,
            img_cols:           a.img_cols,
            channels:           a.channels,
            gf:                 a.gf,
            df:                 a.df,
            epochs:             a.epochs,
            batch_size:         a.batch_size,
            sample_interval:    a.sample_interval,
            model_interval:     a.model_interval,
            lr:                 a.lr,
            beta_1:             a.beta_1,
            seed:               a.seed,
            adversarial_weight: a.adversarial_weight,
            pixel_weight:       a.pixel_weight,
            label_font:         a.label_font,
        }
    }
}

// ─── infer ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Directory where training saved its checkpoints
    #[arg(long, default_value = "models")]
    pub checkpoint_dir: String,

    /// Packed conditioning images
    #[arg(long, default_value = "data/y_test.npy")]
    pub input: String,

    /// Indices of the images to translate
    #[arg(long, value_delimiter = ',', default_value = "0,1,2,3")]
    pub indices: Vec<usize>,

    #[arg(long, default_value = "images/inference.png")]
    pub output: String,

    #[arg(long)]
    pub label_font: Option<String>,
}

impl From<InferArgs> for InferConfig {
    fn from(a: InferArgs) -> Self {
        InferConfig {
            checkpoint_dir: a.checkpoint_dir,
            input:          a.input,
            indices:        a.indices,
            output:         a.output,
            label_font:     a.label_font,
        }
    }
}
