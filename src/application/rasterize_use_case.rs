// ============================================================
// Layer 2 — RasterizeUseCase
// ============================================================
// Renders every code point of a range to its own bitmap:
//
//   Step 1: Parse the font            (Layer 4 - data)
//   Step 2: Validate the range        (Layer 3 - domain)
//   Step 3: Render + save each glyph  (Layer 4 - data)
//
// The first failure aborts the run; files already written stay.

use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use crate::data::rasterizer::{GlyphFont, GlyphRasterizer};
use crate::domain::glyph::CodepointRange;

/// First code point of the CJK Unified Ideographs block ('一')
pub const DEFAULT_START: u32 = 0x4E00;
/// Last code point rendered by default ('龟')
pub const DEFAULT_END:   u32 = 0x9F9F;

#[derive(Debug, Clone)]
pub struct RasterizeConfig {
    pub font_path:  PathBuf,
    pub output_dir: PathBuf,
    pub start:      u32,
    pub end:        u32,
    /// Glyph size in pixels per em
    pub point_size: f32,
    /// Side of the square output canvas
    pub canvas:     u32,
}

impl Default for RasterizeConfig {
    fn default() -> Self {
        Self {
            font_path:  PathBuf::from("fonts/font.ttf"),
            output_dir: PathBuf::from("data/glyphs"),
            start:      DEFAULT_START,
            end:        DEFAULT_END,
            point_size: 32.0,
            canvas:     32,
        }
    }
}

pub struct RasterizeUseCase {
    config: RasterizeConfig,
}

impl RasterizeUseCase {
    pub fn new(config: RasterizeConfig) -> Self {
        Self { config }
    }

    /// Returns the number of bitmaps written.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;

        // ── Step 1: Font ─────────────────────────────────────────────────────
        let font       = GlyphFont::from_file(&cfg.font_path)?;
        let rasterizer = GlyphRasterizer::new(font, cfg.point_size, cfg.canvas)?;

        // ── Step 2: Range ────────────────────────────────────────────────────
        let range = CodepointRange::new(cfg.start, cfg.end)?;
        fs::create_dir_all(&cfg.output_dir)
            .with_context(|| format!("Cannot create '{}'", cfg.output_dir.display()))?;
        tracing::info!(
            "Rendering {} glyphs at {}px onto {}x{} canvases into '{}'",
            range.len(),
            cfg.point_size,
            rasterizer.canvas_size(),
            rasterizer.canvas_size(),
            cfg.output_dir.display()
        );

        // ── Step 3: Render each code point ───────────────────────────────────
        let mut stdout = io::stdout();
        let mut written = 0;
        for cp in range.iter() {
            print!("processing {} / {}\r", cp, cfg.end);
            stdout.flush()?;

            let glyph = rasterizer.render(cp)?;
            if glyph.clipped {
                tracing::warn!(
                    "Glyph U+{:04X} is {}x{}, larger than the {}px canvas; clipped",
                    cp, glyph.glyph_size.0, glyph.glyph_size.1, rasterizer.canvas_size()
                );
            }

            let path = cfg.output_dir.join(CodepointRange::file_name(cp));
            glyph
                .canvas
                .save_with_format(&path, image::ImageFormat::Bmp)
                .with_context(|| format!("Cannot write '{}'", path.display()))?;
            written += 1;
        }
        println!();

        tracing::info!("Wrote {} glyph bitmaps", written);
        Ok(written)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(tmp: &TempDir, start: u32, end: u32) -> RasterizeConfig {
        RasterizeConfig {
            font_path:  PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSans.ttf")),
            output_dir: tmp.path().join("glyphs"),
            start,
            end,
            point_size: 24.0,
            canvas:     32,
        }
    }

    #[test]
    fn test_one_bitmap_per_code_point() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(&tmp, 'A' as u32, 'E' as u32);
        let written = RasterizeUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(written, 5);

        let img = image::open(cfg.output_dir.join("65.bmp")).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (32, 32));
        assert!(img.pixels().any(|p| p[0] > 0));
        assert!(cfg.output_dir.join("69.bmp").exists());
    }

    #[test]
    fn test_missing_glyph_aborts_the_run() {
        let tmp = TempDir::new().unwrap();
        // DejaVu Sans has Latin but no CJK ideographs
        let cfg = config(&tmp, 'Z' as u32, DEFAULT_START);
        assert!(RasterizeUseCase::new(cfg.clone()).execute().is_err());
        assert!(cfg.output_dir.join("90.bmp").exists());
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(RasterizeUseCase::new(config(&tmp, 70, 65)).execute().is_err());
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let cfg = RasterizeConfig { font_path: tmp.path().join("none.ttf"), ..config(&tmp, 65, 65) };
        assert!(RasterizeUseCase::new(cfg).execute().is_err());
    }
}
