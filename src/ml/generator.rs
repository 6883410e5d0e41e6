// ============================================================
// Layer 5 — U-Net Generator
// ============================================================
// Encoder/decoder with skip connections. With gf base filters
// and a 64x64 input:
//
//   d1 [gf,  32]  d2 [2gf, 16]  d3 [4gf, 8]  d4 [8gf, 4]  d5 [8gf, 2]
//   u1 = up(d5) ++ d4   [16gf, 4]
//   u2 = up(u1) ++ d3   [ 8gf, 8]
//   u3 = up(u2) ++ d2   [ 4gf, 16]
//   u4 = up(u3) ++ d1   [ 2gf, 32]
//   out = tanh(conv(upsample(u4)))   [channels, 64]
//
// Height and width must therefore be multiples of 32.

use burn::{prelude::*, tensor::activation::tanh};

use crate::ml::layers::{upsample_nearest_2x, DownBlock, SameConv, UpBlock};

/// Number of stride-2 stages; inputs must be divisible by 2^DEPTH
pub const GENERATOR_DEPTH: usize = 5;

#[derive(Config, Debug)]
pub struct GeneratorConfig {
    /// Image channels, in and out
    pub channels: usize,
    /// Filters in the first encoder stage
    #[config(default = 64)]
    pub filters:  usize,
}

impl GeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        let gf    = self.filters;
        let widths = [gf, gf * 2, gf * 4, gf * 8, gf * 8];

        let mut down     = Vec::with_capacity(widths.len());
        let mut channels = self.channels;
        for (i, &width) in widths.iter().enumerate() {
            down.push(DownBlock::new(channels, width, i > 0, device));
            channels = width;
        }

        // Each decoder stage mirrors the encoder stage it is joined with
        let mut up = Vec::with_capacity(widths.len() - 1);
        for &skip in widths[..widths.len() - 1].iter().rev() {
            up.push(UpBlock::new(channels, skip, device));
            channels = skip * 2;
        }

        let output = SameConv::new(channels, self.channels, 4, device);
        Generator { down, up, output }
    }
}

#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    pub down:   Vec<DownBlock<B>>,
    pub up:     Vec<UpBlock<B>>,
    pub output: SameConv<B>,
}

impl<B: Backend> Generator<B> {
    /// [batch, C, H, W] in [-1, 1] → [batch, C, H, W] in [-1, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut skips = Vec::with_capacity(self.down.len());
        let mut x     = images;
        for block in &self.down {
            x = block.forward(x);
            skips.push(x.clone());
        }

        // The deepest activation is the decoder input, not a skip
        skips.pop();
        for (block, skip) in self.up.iter().zip(skips.into_iter().rev()) {
            x = block.forward(x, skip);
        }

        tanh(self.output.forward(upsample_nearest_2x(x)))
    }
}
