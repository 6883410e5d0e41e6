// ============================================================
// Layer 4 — Image Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<ImagePair>
// into two NCHW tensors:
//
//   Input:  N pairs, each image a flat [C, H, W] slice
//   Output: PairBatch { input: [N, C, H, W], target: [N, C, H, W] }
//
// The reverse direction (tensor → flat planes) lives here too,
// so the sample sheets and the inferencer can read generator
// output without touching tensor internals.

use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::{ImagePair, ImageShape};

/// A batch of aligned conditioning/target images
#[derive(Debug, Clone)]
pub struct PairBatch<B: Backend> {
    /// Conditioning images, shape [batch, channels, height, width]
    pub input: Tensor<B, 4>,

    /// Ground-truth images, same shape as `input`
    pub target: Tensor<B, 4>,
}

/// Creates batches on one device for one image geometry
#[derive(Clone, Debug)]
pub struct PairBatcher<B: Backend> {
    pub device: B::Device,
    pub shape:  ImageShape,
}

impl<B: Backend> PairBatcher<B> {
    pub fn new(device: B::Device, shape: ImageShape) -> Self {
        Self { device, shape }
    }

    /// Stack flat `[C, H, W]` images into one `[N, C, H, W]` tensor.
    pub fn images(&self, items: &[Vec<f32>]) -> Tensor<B, 4> {
        let flat: Vec<f32> = items.iter().flat_map(|v| v.iter().copied()).collect();
        let dims = [items.len(), self.shape.channels, self.shape.height, self.shape.width];
        Tensor::<B, 4>::from_data(TensorData::new(flat, dims), &self.device)
    }
}

impl<B: Backend> Batcher<ImagePair, PairBatch<B>> for PairBatcher<B> {
    fn batch(&self, items: Vec<ImagePair>) -> PairBatch<B> {
        let (inputs, targets): (Vec<Vec<f32>>, Vec<Vec<f32>>) =
            items.into_iter().map(|p| (p.input, p.target)).unzip();

        PairBatch {
            input:  self.images(&inputs),
            target: self.images(&targets),
        }
    }
}

/// Copy a `[N, C, H, W]` tensor back to host memory.
pub fn tensor_to_planes<B: Backend>(images: Tensor<B, 4>) -> Result<(Vec<f32>, [usize; 4])> {
    let dims   = images.dims();
    let values = images
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read tensor values: {e:?}"))?;
    Ok((values, dims))
}
