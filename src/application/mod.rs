// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per subcommand. Each owns a plain config struct
// (never a clap type) and coordinates the lower layers:
//
//   rasterize_use_case — font + code point range → BMP files
//   pack_use_case      — image directories → .npy arrays
//   train_use_case     — .npy arrays → checkpoints, metrics, sheets
//   infer_use_case     — checkpoint + .npy array → one PNG row
//
// No model math lives here; only workflow coordination.

pub mod rasterize_use_case;

pub mod pack_use_case;

// The training workflow and its persisted configuration
pub mod train_use_case;

pub mod infer_use_case;
