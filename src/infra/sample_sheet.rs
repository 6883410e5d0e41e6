// ============================================================
// Layer 6 — Sample Sheets
// ============================================================
// Writes a grid of images to PNG so training progress can be
// eyeballed:
//
//   ┌──────────┬──────────┬──────────┐
//   │ Original │ Original │ Original │   one row per title
//   │  [img]   │  [img]   │  [img]   │   one column per image
//   ├──────────┼──────────┼──────────┤
//   │Generated │Generated │Generated │
//   │  [img]   │  [img]   │  [img]   │
//   └──────────┴──────────┴──────────┘
//
// Titles are drawn only when a label font is available; the
// grid itself never depends on one. Cells are RGB: grayscale
// images are replicated across the three channels.

use anyhow::{bail, ensure, Context, Result};
use image::{imageops, GrayImage, Rgb, RgbImage};
use std::{fs, path::Path};

use crate::data::rasterizer::GlyphFont;
use crate::domain::pixel::to_pixel;

/// Blank space around every cell
const MARGIN: u32 = 4;
/// Pixel height of cell titles
const TITLE_PX: f32 = 12.0;
const BACKGROUND: u8 = 255;

/// One titled row of the sheet
pub struct SheetRow {
    pub title:  String,
    pub images: Vec<RgbImage>,
}

impl SheetRow {
    pub fn new(title: impl Into<String>, images: Vec<RgbImage>) -> Self {
        Self { title: title.into(), images }
    }
}

/// Lays rows out on a white canvas, optionally with titles.
pub struct SampleSheet {
    font: Option<GlyphFont>,
}

impl SampleSheet {
    pub fn new(font: Option<GlyphFont>) -> Self {
        Self { font }
    }

    pub fn compose(&self, rows: &[SheetRow]) -> Result<RgbImage> {
        ensure!(!rows.is_empty(), "A sample sheet needs at least one row");

        let titles: Vec<Option<GrayImage>> = rows
            .iter()
            .map(|r| self.font.as_ref().map(|f| f.render_text(&r.title, TITLE_PX)))
            .collect();

        let columns = rows.iter().map(|r| r.images.len()).max().unwrap_or(0) as u32;
        let image_w = rows.iter().flat_map(|r| &r.images).map(|i| i.width()).max().unwrap_or(0);
        let image_h = rows.iter().flat_map(|r| &r.images).map(|i| i.height()).max().unwrap_or(0);
        let title_w = titles.iter().flatten().map(|t| t.width()).max().unwrap_or(0);
        let title_h = titles.iter().flatten().map(|t| t.height()).max().unwrap_or(0);
        ensure!(columns > 0, "Sample sheet rows hold no images");

        let cell_w = image_w.max(title_w);
        let cell_h = image_h + title_h;
        let width  = columns * (cell_w + MARGIN) + MARGIN;
        let height = rows.len() as u32 * (cell_h + MARGIN) + MARGIN;

        let mut sheet = RgbImage::from_pixel(width, height, Rgb([BACKGROUND; 3]));

        for (r, (row, title)) in rows.iter().zip(&titles).enumerate() {
            let top = MARGIN + r as u32 * (cell_h + MARGIN);
            for (c, image) in row.images.iter().enumerate() {
                let left = MARGIN + c as u32 * (cell_w + MARGIN);
                if let Some(title) = title {
                    let x = left + (cell_w - title.width()) / 2;
                    draw_ink(&mut sheet, title, x, top);
                }
                let x = left + (cell_w - image.width()) / 2;
                imageops::replace(&mut sheet, image, x as i64, (top + title_h) as i64);
            }
        }
        Ok(sheet)
    }

    /// Compose and write a PNG, creating parent directories.
    pub fn save(&self, rows: &[SheetRow], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        self.compose(rows)?
            .save(path)
            .with_context(|| format!("Cannot write sample sheet '{}'", path.display()))?;
        tracing::debug!("Saved sample sheet '{}'", path.display());
        Ok(())
    }
}

/// Darken `sheet` by glyph coverage, black text on the background.
fn draw_ink(sheet: &mut RgbImage, coverage: &GrayImage, x: u32, y: u32) {
    for (dx, dy, ink) in coverage.enumerate_pixels() {
        let (px, py) = (x + dx, y + dy);
        if px < sheet.width() && py < sheet.height() {
            let Rgb(old) = *sheet.get_pixel(px, py);
            sheet.put_pixel(px, py, Rgb(old.map(|v| v.min(255 - ink[0]))));
        }
    }
}

/// Split flat `[N, C, H, W]` model values into displayable RGB
/// images. One channel is shown as gray; three as colour. Any
/// other channel count is rejected.
pub fn planes_to_images(values: &[f32], dims: [usize; 4]) -> Result<Vec<RgbImage>> {
    let [n, c, h, w] = dims;
    if c != 1 && c != 3 {
        bail!("Sample sheets show 1 or 3 channel images, got {c}");
    }
    ensure!(
        values.len() == n * c * h * w,
        "Expected {} values for {:?}, got {}",
        n * c * h * w, dims, values.len()
    );

    let plane = h * w;
    let images = (0..n)
        .map(|i| {
            let image = &values[i * c * plane..(i + 1) * c * plane];
            RgbImage::from_fn(w as u32, h as u32, |x, y| {
                let at = y as usize * w + x as usize;
                let channel = |k: usize| to_pixel(image[(k % c) * plane + at]);
                Rgb([channel(0), channel(1), channel(2)])
            })
        })
        .collect();
    Ok(images)
}
