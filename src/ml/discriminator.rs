// ============================================================
// Layer 5 — PatchGAN Discriminator
// ============================================================
// Scores a (conditioning, candidate) pair per spatial patch.
// The two images are stacked on the channel axis, pushed
// through four stride-2 blocks and projected to one channel:
//
//   [B, 2C, H, W] → ... → [B, 1, H/16, W/16]
//
// Each output cell is an independent real/fake score for the
// patch of the input it sees.

use burn::prelude::*;

use crate::ml::layers::{DownBlock, SameConv};

/// Number of stride-2 stages; the patch grid is (H, W) / 2^DEPTH
pub const DISCRIMINATOR_DEPTH: usize = 4;

#[derive(Config, Debug)]
pub struct DiscriminatorConfig {
    /// Channels of each image in the pair
    pub channels: usize,
    /// Filters in the first stage
    #[config(default = 64)]
    pub filters:  usize,
}

impl DiscriminatorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Discriminator<B> {
        let df     = self.filters;
        let widths = [df, df * 2, df * 4, df * 8];

        let mut blocks   = Vec::with_capacity(widths.len());
        let mut channels = self.channels * 2;
        for (i, &width) in widths.iter().enumerate() {
            blocks.push(DownBlock::new(channels, width, i > 0, device));
            channels = width;
        }

        let validity = SameConv::new(channels, 1, 2, device);
        Discriminator { blocks, validity }
    }

    /// Patch grid `[1, H/16, W/16]` scored for an `height x width` image
    pub fn patch_grid(height: usize, width: usize) -> [usize; 3] {
        let scale = 1 << DISCRIMINATOR_DEPTH;
        [1, height / scale, width / scale]
    }
}

#[derive(Module, Debug)]
pub struct Discriminator<B: Backend> {
    pub blocks:   Vec<DownBlock<B>>,
    pub validity: SameConv<B>,
}

impl<B: Backend> Discriminator<B> {
    pub fn forward(&self, condition: Tensor<B, 4>, candidate: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = Tensor::cat(vec![condition, candidate], 1);
        for block in &self.blocks {
            x = block.forward(x);
        }
        self.validity.forward(x)
    }
}
