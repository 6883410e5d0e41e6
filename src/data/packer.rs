// ============================================================
// Layer 4 — Dataset Packer
// ============================================================
// Decodes a list of images from one source and stacks them
// into a single array with a new leading axis:
//
//   N images of (H, W)     →  (N, H, W)
//   N images of (H, W, C)  →  (N, H, W, C)
//
// The array is persisted as a NumPy `.npy` file so the packed
// datasets stay readable by the usual array tooling.

use anyhow::{bail, ensure, Context, Result};
use ndarray::{ArrayD, ArrayViewD, Axis};
use ndarray_npy::{read_npy, write_npy};
use std::{
    io::{self, Write},
    path::Path,
};

use crate::domain::traits::ImageSource;

/// Decode `names` from `source` in order and stack them.
///
/// Fails on the first undecodable image, on an empty list, and on
/// any image whose shape differs from the first one.
pub fn decode_to_array<S: ImageSource + ?Sized>(source: &S, names: &[String]) -> Result<ArrayD<u8>> {
    ensure!(!names.is_empty(), "No images to pack from '{}'", source.describe());

    let mut decoded: Vec<ArrayD<u8>> = Vec::with_capacity(names.len());
    let mut stdout = io::stdout();

    for name in names {
        print!("processing {name}\r");
        stdout.flush()?;

        let arr = source.decode(name)?;
        if let Some(first) = decoded.first() {
            if first.shape() != arr.shape() {
                bail!(
                    "Image '{}' in '{}' has shape {:?}, expected {:?} like '{}'",
                    name,
                    source.describe(),
                    arr.shape(),
                    first.shape(),
                    names[0],
                );
            }
        }
        decoded.push(arr);
    }
    println!();

    let views: Vec<ArrayViewD<u8>> = decoded.iter().map(|a| a.view()).collect();
    let stacked = ndarray::stack(Axis(0), &views)
        .with_context(|| format!("Cannot stack images from '{}'", source.describe()))?;

    tracing::info!(
        "Packed {} images from '{}' into shape {:?}",
        names.len(),
        source.describe(),
        stacked.shape()
    );
    Ok(stacked)
}

/// Write a packed array to `path` in `.npy` format, overwriting.
pub fn save_packed(path: &Path, array: &ArrayD<u8>) -> Result<()> {
    write_npy(path, array)
        .with_context(|| format!("Cannot write packed array '{}'", path.display()))?;
    tracing::info!("Saved {:?} array to '{}'", array.shape(), path.display());
    Ok(())
}

/// Read a packed array back from a `.npy` file.
pub fn load_packed(path: &Path) -> Result<ArrayD<u8>> {
    let array: ArrayD<u8> = read_npy(path)
        .with_context(|| format!("Cannot read packed array '{}'", path.display()))?;
    tracing::debug!("Loaded {:?} array from '{}'", array.shape(), path.display());
    Ok(array)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        image_dir::ImageDir,
        sampler::{sample_without_replacement, seeded_rng},
    };
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    fn write_gray(dir: &Path, name: &str, w: u32, h: u32, seed: u8) {
        let img = GrayImage::from_fn(w, h, |x, y| {
            Luma([seed.wrapping_mul(31).wrapping_add((x * 7 + y * 13) as u8)])
        });
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_stacked_shape_is_count_then_image_dims() {
        let tmp = TempDir::new().unwrap();
        for i in 0..4u8 {
            write_gray(tmp.path(), &format!("{i}.png"), 6, 5, i);
        }
        let source = ImageDir::new(tmp.path());
        let names  = source.list_entries().unwrap();

        let arr = decode_to_array(&source, &names).unwrap();
        assert_eq!(arr.shape(), &[4, 5, 6]);
    }

    #[test]
    fn test_mismatched_sizes_are_rejected() {
        let tmp = TempDir::new().unwrap();
        write_gray(tmp.path(), "small.png", 4, 4, 1);
        write_gray(tmp.path(), "large.png", 8, 8, 2);
        let source = ImageDir::new(tmp.path());
        let names  = vec!["small.png".to_string(), "large.png".to_string()];

        assert!(decode_to_array(&source, &names).is_err());
    }

    #[test]
    fn test_empty_name_list_is_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(decode_to_array(&ImageDir::new(tmp.path()), &[]).is_err());
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        write_gray(tmp.path(), "present.png", 4, 4, 1);
        let names = vec!["present.png".to_string(), "absent.png".to_string()];
        assert!(decode_to_array(&ImageDir::new(tmp.path()), &names).is_err());
    }

    #[test]
    fn test_pack_ten_images_and_reload_matches_direct_decode() {
        let tmp = TempDir::new().unwrap();
        let img_dir = tmp.path().join("glyphs");
        std::fs::create_dir(&img_dir).unwrap();
        for i in 0..10u8 {
            write_gray(&img_dir, &format!("{i}.bmp"), 8, 8, i);
        }

        let source    = ImageDir::new(&img_dir);
        let mut pool  = source.list_entries().unwrap();
        let picked    = sample_without_replacement(&mut pool, 10, &mut seeded_rng(17134)).unwrap();
        assert!(pool.is_empty());

        let packed = decode_to_array(&source, &picked).unwrap();
        let path   = tmp.path().join("glyphs_train.npy");
        save_packed(&path, &packed).unwrap();

        let reloaded = load_packed(&path).unwrap();
        assert_eq!(reloaded.shape(), &[10, 8, 8]);
        for (i, name) in picked.iter().enumerate() {
            let direct = source.decode(name).unwrap();
            assert_eq!(reloaded.index_axis(Axis(0), i), direct.view());
        }
    }
}
