// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the training and inference
// workflows:
//
//   checkpoint.rs   — Model weights via Burn's CompactRecorder,
//                     plus the TrainConfig JSON that inference
//                     needs to rebuild the generator.
//
//   metrics.rs      — Per-batch losses and accuracy appended to
//                     a CSV file.
//
//   sample_sheet.rs — PNG grids of condition / generated /
//                     target images, titled when a label font
//                     is available.
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Titled image grids written during training and inference
pub mod sample_sheet;
