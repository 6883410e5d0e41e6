// ============================================================
// Layer 4 — Paired Image Dataset
// ============================================================
// Packed arrays are stored channel-last with raw 8-bit pixels.
// The networks want channel-first floats in [-1, 1], so each
// array is converted once on load:
//
//   (N, H, W) or (N, H, W, C) u8  →  N × [C, H, W] f32
//
// A PairedDataset lines up conditioning inputs with their
// ground-truth targets by index.

use anyhow::{bail, ensure, Result};
use burn::data::dataset::Dataset;
use ndarray::{ArrayD, Axis, Ix4};
use serde::{Deserialize, Serialize};

use crate::domain::pixel;

/// Channel-first image geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    pub channels: usize,
    pub height:   usize,
    pub width:    usize,
}

impl ImageShape {
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self { channels, height, width }
    }

    /// Values per image
    pub fn len(&self) -> usize {
        self.channels * self.height * self.width
    }
}

/// A stack of same-shaped images, already rescaled to [-1, 1]
#[derive(Debug, Clone)]
pub struct ImageStack {
    shape:  ImageShape,
    count:  usize,
    values: Vec<f32>,
}

impl ImageStack {
    /// Convert a packed `(N, H, W[, C])` array.
    pub fn from_packed(array: &ArrayD<u8>) -> Result<Self> {
        let nhwc = match array.ndim() {
            3 => array.clone().insert_axis(Axis(3)),
            4 => array.clone(),
            n => bail!("Packed array must have shape (N, H, W) or (N, H, W, C), got {n} axes"),
        };
        let nhwc = nhwc.into_dimensionality::<Ix4>()?;
        let (count, height, width, channels) = nhwc.dim();
        ensure!(count > 0, "Packed array holds no images");

        // iter() walks the permuted view in logical (N, C, H, W) order
        let values: Vec<f32> = nhwc
            .permuted_axes([0, 3, 1, 2])
            .iter()
            .map(|&v| pixel::to_signed_unit(v))
            .collect();

        Ok(Self {
            shape: ImageShape::new(channels, height, width),
            count,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    /// Values of image `index` in `[C, H, W]` order
    pub fn item(&self, index: usize) -> Option<&[f32]> {
        if index >= self.count {
            return None;
        }
        let n = self.shape.len();
        Some(&self.values[index * n..(index + 1) * n])
    }

    /// Copy out the images at `indices`, failing on any out-of-range index.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<Vec<f32>>> {
        indices
            .iter()
            .map(|&i| {
                self.item(i).map(|v| v.to_vec()).ok_or_else(|| {
                    anyhow::anyhow!("Index {} is out of range for {} images", i, self.count)
                })
            })
            .collect()
    }

    /// Fail unless the images have exactly `expected` geometry.
    pub fn ensure_shape(&self, expected: ImageShape, what: &str) -> Result<()> {
        ensure!(
            self.shape == expected,
            "{} images are {}x{}x{} (CxHxW) but the model expects {}x{}x{}",
            what,
            self.shape.channels, self.shape.height, self.shape.width,
            expected.channels,   expected.height,   expected.width,
        );
        Ok(())
    }
}

/// One (conditioning input, ground truth) pair
#[derive(Debug, Clone)]
pub struct ImagePair {
    pub input:  Vec<f32>,
    pub target: Vec<f32>,
}

/// Conditioning inputs and targets aligned by index
#[derive(Debug, Clone)]
pub struct PairedDataset {
    input:  ImageStack,
    target: ImageStack,
}

impl PairedDataset {
    pub fn new(input: ImageStack, target: ImageStack) -> Result<Self> {
        ensure!(
            input.len() == target.len(),
            "Conditioning set has {} images but target set has {}",
            input.len(),
            target.len()
        );
        ensure!(
            input.shape() == target.shape(),
            "Conditioning images {:?} and target images {:?} differ in shape",
            input.shape(),
            target.shape()
        );
        Ok(Self { input, target })
    }

    pub fn inputs(&self) -> &ImageStack {
        &self.input
    }
}

impl Dataset<ImagePair> for PairedDataset {
    fn get(&self, index: usize) -> Option<ImagePair> {
        Some(ImagePair {
            input:  self.input.item(index)?.to_vec(),
            target: self.target.item(index)?.to_vec(),
        })
    }

    fn len(&self) -> usize {
        self.input.len()
    }
}
