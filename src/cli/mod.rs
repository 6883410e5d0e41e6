// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and hands each subcommand to its Layer 2 use case.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Commands;

use crate::application::{
    infer_use_case::InferUseCase,
    pack_use_case::PackUseCase,
    rasterize_use_case::RasterizeUseCase,
    train_use_case::TrainUseCase,
};

/// Glyph-to-glyph image translation toolkit
#[derive(Parser, Debug)]
#[command(
    name = "glyph-pix2pix",
    version = "0.1.0",
    about = "Rasterize glyphs, pack them into arrays and train a pix2pix translator."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Rasterize(args) => {
                tracing::info!("Rasterizing with font '{}'", args.font.display());
                let written = RasterizeUseCase::new(args.into()).execute()?;
                println!("Wrote {written} glyph bitmaps.");
            }
            Commands::Pack(args) => {
                let written = PackUseCase::new(args.into()).execute()?;
                for path in written {
                    println!("Wrote {}", path.display());
                }
            }
            Commands::Train(args) => {
                tracing::info!("Training on '{}' → '{}'", args.input_train, args.target_train);
                TrainUseCase::new(args.into()).execute()?;
                println!("Training complete. Checkpoints saved.");
            }
            Commands::Infer(args) => {
                let output = InferUseCase::new(args.into()).execute()?;
                println!("Translations written to {}", output.display());
            }
        }
        Ok(())
    }
}
