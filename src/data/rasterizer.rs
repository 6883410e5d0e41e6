// ============================================================
// Layer 4 — Glyph Rasterizer
// ============================================================
// Renders single code points with fontdue and pastes the tight
// glyph bitmap into the centre of a square grayscale canvas:
//
//   offset = (canvas - glyph) / 2        per axis, toward zero
//
// A glyph wider or taller than the canvas gives a negative
// offset. The paste is clipped to the canvas and the glyph is
// reported as clipped; the caller decides how loudly to say so.
//
// The same font wrapper also lays out short strings, which the
// sample sheets use for their row titles.

use anyhow::{anyhow, ensure, Context, Result};
use fontdue::{Font, FontSettings};
use image::{imageops, GrayImage};
use std::{fs, path::Path};

/// A parsed font face
pub struct GlyphFont {
    font: Font,
}

impl GlyphFont {
    /// Load and parse a TrueType/OpenType font file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Cannot read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
            .with_context(|| format!("Cannot parse font '{}'", path.display()))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow!("{e}"))?;
        Ok(Self { font })
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    /// Tight coverage bitmap for one character at `px` pixels per em.
    pub fn glyph_bitmap(&self, ch: char, px: f32) -> Result<GrayImage> {
        let (metrics, coverage) = self.font.rasterize(ch, px);
        GrayImage::from_raw(metrics.width as u32, metrics.height as u32, coverage)
            .ok_or_else(|| anyhow!("Glyph bitmap for {ch:?} has an inconsistent size"))
    }

    /// Lay out `text` on one line as white-on-black coverage.
    pub fn render_text(&self, text: &str, px: f32) -> GrayImage {
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px);

        let glyphs: Vec<_> = text.chars().map(|c| self.font.rasterize(c, px)).collect();
        let width: f32 = glyphs.iter().map(|(m, _)| m.advance_width).sum();
        let mut line = GrayImage::new(width.ceil().max(1.0) as u32, px.ceil() as u32 + 1);

        let mut pen = 0.0f32;
        for (metrics, coverage) in glyphs {
            if let Some(bitmap) =
                GrayImage::from_raw(metrics.width as u32, metrics.height as u32, coverage)
            {
                let x = (pen + metrics.xmin as f32).round() as i64;
                let y = (ascent - metrics.height as f32 - metrics.ymin as f32).round() as i64;
                imageops::replace(&mut line, &bitmap, x, y);
            }
            pen += metrics.advance_width;
        }
        line
    }
}

/// The result of rendering one code point onto the canvas
pub struct RenderedGlyph {
    pub canvas:  GrayImage,
    /// Size of the tight glyph bitmap before pasting
    pub glyph_size: (u32, u32),
    /// True when the glyph did not fit and was cut at the canvas edge
    pub clipped: bool,
}

/// Renders code points of one font at a fixed size onto a fixed canvas
pub struct GlyphRasterizer {
    font:       GlyphFont,
    point_size: f32,
    canvas:     u32,
}

impl GlyphRasterizer {
    pub fn new(font: GlyphFont, point_size: f32, canvas: u32) -> Result<Self> {
        ensure!(canvas > 0, "Canvas size must be positive");
        ensure!(point_size > 0.0, "Point size must be positive");
        Ok(Self { font, point_size, canvas })
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas
    }

    /// Render `codepoint` centred on a black canvas.
    ///
    /// Fails when the value is not a Unicode scalar or the font has
    /// no glyph for it.
    pub fn render(&self, codepoint: u32) -> Result<RenderedGlyph> {
        let ch = char::from_u32(codepoint)
            .ok_or_else(|| anyhow!("U+{codepoint:04X} is not a Unicode scalar value"))?;
        ensure!(self.font.has_glyph(ch), "Font has no glyph for U+{codepoint:04X} ({ch})");

        let glyph  = self.font.glyph_bitmap(ch, self.point_size)?;
        let (w, h) = glyph.dimensions();
        let x = (self.canvas as i64 - w as i64) / 2;
        let y = (self.canvas as i64 - h as i64) / 2;

        let mut canvas = GrayImage::new(self.canvas, self.canvas);
        imageops::replace(&mut canvas, &glyph, x, y);

        Ok(RenderedGlyph {
            canvas,
            glyph_size: (w, h),
            clipped: x < 0 || y < 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_FONT: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSans.ttf"));

    fn rasterizer(point_size: f32, canvas: u32) -> GlyphRasterizer {
        let font = GlyphFont::from_bytes(TEST_FONT.to_vec()).unwrap();
        GlyphRasterizer::new(font, point_size, canvas).unwrap()
    }

    /// (left, top, right, bottom) of the non-zero pixels, inclusive
    fn ink_bounds(img: &GrayImage) -> (u32, u32, u32, u32) {
        let mut b = (u32::MAX, u32::MAX, 0, 0);
        for (x, y, p) in img.enumerate_pixels() {
            if p.0[0] > 0 {
                b = (b.0.min(x), b.1.min(y), b.2.max(x), b.3.max(y));
            }
        }
        b
    }

    #[test]
    fn test_glyph_is_centred_on_canvas() {
        let r     = rasterizer(20.0, 32);
        let glyph = r.render('H' as u32).unwrap();
        assert_eq!(glyph.canvas.dimensions(), (32, 32));
        assert!(!glyph.clipped);

        let (left, top, right, bottom) = ink_bounds(&glyph.canvas);
        let margin_right  = 31 - right;
        let margin_bottom = 31 - bottom;
        assert!((left as i64 - margin_right as i64).abs() <= 2);
        assert!((top as i64 - margin_bottom as i64).abs() <= 2);
    }

    #[test]
    fn test_oversized_glyph_is_clipped_not_rejected() {
        let r     = rasterizer(64.0, 16);
        let glyph = r.render('W' as u32).unwrap();
        assert!(glyph.clipped);
        assert!(glyph.glyph_size.0 > 16);
        assert_eq!(glyph.canvas.dimensions(), (16, 16));
    }

    #[test]
    fn test_missing_glyph_is_an_error() {
        // DejaVu Sans carries no CJK ideographs
        assert!(rasterizer(32.0, 32).render(0x4E00).is_err());
    }

    #[test]
    fn test_surrogate_code_point_is_an_error() {
        assert!(rasterizer(32.0, 32).render(0xD800).is_err());
    }

    #[test]
    fn test_invalid_font_bytes_are_rejected() {
        assert!(GlyphFont::from_bytes(vec![0u8; 16]).is_err());
    }

    #[test]
    fn test_render_text_produces_ink() {
        let font = GlyphFont::from_bytes(TEST_FONT.to_vec()).unwrap();
        let line = font.render_text("Generated", 12.0);
        assert!(line.width() > 30);
        assert!(line.pixels().any(|p| p.0[0] > 0));
    }
}
