// ============================================================
// Layer 4 — Image Directory
// ============================================================
// A flat directory of image files (the rasterizer's output, or
// any manually collected set of same-sized images).
//
// Decoding keeps the image's own channel layout:
//   1 channel  → (H, W)
//   n channels → (H, W, n)
// except that colour decodes with no actual colour become (H, W).
// which is the layout the packed arrays are stored in.

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{ArrayD, IxDyn};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::traits::ImageSource;

/// A directory whose regular files are decodable images
#[derive(Debug, Clone)]
pub struct ImageDir {
    dir: PathBuf,
}

impl ImageDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl ImageSource for ImageDir {
    /// File names of the regular files in the directory, symlinks
    /// to files included. Order is whatever the filesystem
    /// enumeration yields.
    fn list_entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            let meta = fs::metadata(&path)
                .with_context(|| format!("Cannot stat '{}'", path.display()))?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().into_string().map_err(|raw| {
                anyhow::anyhow!("Non UTF-8 file name in '{}': {:?}", self.dir.display(), raw)
            })?;
            names.push(name);
        }

        tracing::debug!("Listed {} entries in '{}'", names.len(), self.dir.display());
        Ok(names)
    }

    fn decode(&self, name: &str) -> Result<ArrayD<u8>> {
        let path = self.dir.join(name);
        let img  = image::open(&path)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?;
        image_to_array(img)
            .with_context(|| format!("Cannot convert '{}' to an array", path.display()))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Convert a decoded image into an 8-bit array, keeping its channel count.
///
/// Colour decodes whose channels agree at every pixel (and whose
/// alpha, if any, is opaque) are collapsed to one channel. Paletted
/// grayscale files such as 8-bit BMPs decode as RGB.
pub fn image_to_array(img: DynamicImage) -> Result<ArrayD<u8>> {
    let height = img.height() as usize;
    let width  = img.width() as usize;

    let (channels, raw) = match img.color().channel_count() {
        1 => (1, img.into_luma8().into_raw()),
        2 => (2, img.into_luma_alpha8().into_raw()),
        3 => (3, img.into_rgb8().into_raw()),
        _ => (4, img.into_rgba8().into_raw()),
    };
    let (channels, raw) = match collapse_gray(channels, &raw) {
        Some(gray) => (1, gray),
        None       => (channels, raw),
    };

    let shape = if channels == 1 {
        vec![height, width]
    } else {
        vec![height, width, channels]
    };

    Ok(ArrayD::from_shape_vec(IxDyn(&shape), raw)?)
}

/// Single-channel copy of interleaved RGB/RGBA pixels that carry no colour.
fn collapse_gray(channels: usize, raw: &[u8]) -> Option<Vec<u8>> {
    if channels < 3 {
        return None;
    }
    let gray = raw
        .chunks_exact(channels)
        .all(|p| p[0] == p[1] && p[1] == p[2] && (channels == 3 || p[3] == u8::MAX));
    gray.then(|| raw.chunks_exact(channels).map(|p| p[0]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_list_entries_skips_subdirectories() {
        let tmp = TempDir::new().unwrap();
        GrayImage::new(4, 4).save(tmp.path().join("a.png")).unwrap();
        GrayImage::new(4, 4).save(tmp.path().join("b.png")).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();

        let mut names = ImageDir::new(tmp.path()).list_entries().unwrap();
        names.sort();
        assert_eq!(names, vec!["a.png".to_string(), "b.png".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_entries_follows_file_symlinks() {
        let tmp = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        GrayImage::new(4, 4).save(src.path().join("a.png")).unwrap();
        std::os::unix::fs::symlink(src.path().join("a.png"), tmp.path().join("link.png")).unwrap();
        std::os::unix::fs::symlink(src.path(), tmp.path().join("dir_link")).unwrap();

        let names = ImageDir::new(tmp.path()).list_entries().unwrap();
        assert_eq!(names, vec!["link.png".to_string()]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(ImageDir::new(tmp.path().join("nope")).list_entries().is_err());
    }

    #[test]
    fn test_grayscale_decodes_to_height_by_width() {
        let tmp = TempDir::new().unwrap();
        let mut img = GrayImage::new(5, 3);
        img.put_pixel(4, 2, Luma([200]));
        img.save(tmp.path().join("g.png")).unwrap();

        let arr = ImageDir::new(tmp.path()).decode("g.png").unwrap();
        assert_eq!(arr.shape(), &[3, 5]);
        assert_eq!(arr[[2, 4]], 200);
        assert_eq!(arr[[0, 0]], 0);
    }

    #[test]
    fn test_rgb_keeps_channel_axis() {
        let tmp = TempDir::new().unwrap();
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        img.save(tmp.path().join("c.png")).unwrap();

        let arr = ImageDir::new(tmp.path()).decode("c.png").unwrap();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[0, 1, 2]], 30);
    }

    #[test]
    fn test_grayscale_bmp_decodes_to_one_channel() {
        let tmp = TempDir::new().unwrap();
        let mut img = GrayImage::new(4, 3);
        img.put_pixel(1, 2, Luma([90]));
        img.save(tmp.path().join("g.bmp")).unwrap();

        let arr = ImageDir::new(tmp.path()).decode("g.bmp").unwrap();
        assert_eq!(arr.shape(), &[3, 4]);
        assert_eq!(arr[[2, 1]], 90);
    }

    #[test]
    fn test_colourless_rgb_collapses_but_translucent_rgba_does_not() {
        let rgb  = RgbImage::from_pixel(2, 2, Rgb([7, 7, 7]));
        let arr  = image_to_array(DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(arr.shape(), &[2, 2]);

        let rgba = image::RgbaImage::from_pixel(2, 2, image::Rgba([7, 7, 7, 100]));
        let arr  = image_to_array(DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(arr.shape(), &[2, 2, 4]);
    }

    #[test]
    fn test_undecodable_file_fails() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("junk.png"), b"not an image").unwrap();
        assert!(ImageDir::new(tmp.path()).decode("junk.png").is_err());
    }
}
