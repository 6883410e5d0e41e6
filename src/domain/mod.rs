// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that name the concepts shared by the three
// pipelines. Nothing in here touches burn, the filesystem or
// an image codec.
//
//   glyph.rs  — inclusive code-point ranges for the rasterizer
//   split.rs  — train/test roles and packed-array file naming
//   pixel.rs  — the [0, 255] <-> [-1, 1] affine pixel mapping
//   traits.rs — seams the data layer implements

/// Inclusive Unicode code-point ranges
pub mod glyph;

/// Dataset split roles and `.npy` naming
pub mod split;

/// Pixel rescaling shared by the trainer and the inferencer
pub mod pixel;

/// Core abstractions (traits) that other layers implement
pub mod traits;
