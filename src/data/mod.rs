// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between pixels on disk and tensors on a device.
//
//   font file ──► GlyphRasterizer ──► <codepoint>.bmp
//
//   image dir ──► ImageDir ──► sampler ──► packer ──► *.npy
//
//   *.npy ──► ImageStack ──► PairedDataset ──► PairBatcher ──► tensors

/// Renders code points to centred grayscale bitmaps
pub mod rasterizer;

/// Lists and decodes a directory of images
pub mod image_dir;

/// Seeded sampling without replacement
pub mod sampler;

/// Stacks decoded images and reads/writes `.npy` files
pub mod packer;

/// Implements Burn's Dataset trait over packed arrays
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
