// ============================================================
// Layer 5 — Shared Building Blocks
// ============================================================
// Convolution blocks used by both networks. All tensors are
// NCHW. Two "same" padding cases matter here:
//
//   4x4 stride 2:  pad 1 on every side → H/2 × W/2 exactly
//   kxk stride 1, k even:  the total padding k-1 is odd, so it
//       cannot be split evenly. We pad k/2 on every side, which
//       yields one extra row and column, then drop the first
//       row and column. What remains is padding (k-1)/2 before
//       and k/2 after, the usual "same" convention.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{leaky_relu, relu},
};

/// Running-average momentum, in the "weight of the new batch" convention
const NORM_MOMENTUM: f64 = 0.2;
const NORM_EPSILON:  f64 = 1e-3;
const LEAKY_SLOPE:   f64 = 0.2;

pub fn batch_norm<B: Backend>(features: usize, device: &B::Device) -> BatchNorm<B, 2> {
    BatchNormConfig::new(features)
        .with_momentum(NORM_MOMENTUM)
        .with_epsilon(NORM_EPSILON)
        .init(device)
}

// ─── SameConv ─────────────────────────────────────────────────────────────────
/// Stride-1 convolution whose output has the input's height and width.
#[derive(Module, Debug)]
pub struct SameConv<B: Backend> {
    pub conv:   Conv2d<B>,
    pub kernel: usize,
}

impl<B: Backend> SameConv<B> {
    pub fn new(channels_in: usize, channels_out: usize, kernel: usize, device: &B::Device) -> Self {
        let pad  = kernel / 2;
        let conv = Conv2dConfig::new([channels_in, channels_out], [kernel, kernel])
            .with_padding(PaddingConfig2d::Explicit(pad, pad))
            .init(device);
        Self { conv, kernel }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, height, width] = x.dims();
        let out    = self.conv.forward(x);
        let [batch, channels, _, _] = out.dims();
        let offset = self.kernel / 2 - (self.kernel - 1) / 2;
        out.slice([0..batch, 0..channels, offset..offset + height, offset..offset + width])
    }
}

// ─── DownBlock ────────────────────────────────────────────────────────────────
/// conv 4x4 stride 2 → LeakyReLU(0.2) → optional BatchNorm
#[derive(Module, Debug)]
pub struct DownBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: Option<BatchNorm<B, 2>>,
}

impl<B: Backend> DownBlock<B> {
    pub fn new(channels_in: usize, channels_out: usize, normalize: bool, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([channels_in, channels_out], [4, 4])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let norm = normalize.then(|| batch_norm(channels_out, device));
        Self { conv, norm }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = leaky_relu(self.conv.forward(x), LEAKY_SLOPE);
        match &self.norm {
            Some(norm) => norm.forward(x),
            None       => x,
        }
    }
}

// ─── UpBlock ──────────────────────────────────────────────────────────────────
/// upsample x2 → conv 4x4 same → ReLU → BatchNorm → concat(skip)
#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    pub conv: SameConv<B>,
    pub norm: BatchNorm<B, 2>,
}

impl<B: Backend> UpBlock<B> {
    pub fn new(channels_in: usize, channels_out: usize, device: &B::Device) -> Self {
        Self {
            conv: SameConv::new(channels_in, channels_out, 4, device),
            norm: batch_norm(channels_out, device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>, skip: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.conv.forward(upsample_nearest_2x(x)));
        let x = self.norm.forward(x);
        Tensor::cat(vec![x, skip], 1)
    }
}

/// Nearest-neighbour upsampling by 2 on both spatial axes.
pub fn upsample_nearest_2x<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [batch, channels, height, width] = x.dims();
    x.reshape([batch, channels, height, 1, width, 1])
        .expand([batch, channels, height, 2, width, 2])
        .reshape([batch, channels, height * 2, width * 2])
}
