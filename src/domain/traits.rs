// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The packer only needs two things from wherever its images
// live: a listing and a way to decode one entry. ImageDir
// implements this for a directory on disk.

use anyhow::Result;
use ndarray::ArrayD;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can enumerate and decode images by name.
///
/// Implementations:
///   - ImageDir → a flat directory of image files
pub trait ImageSource {
    /// Names of the available entries, in enumeration order.
    fn list_entries(&self) -> Result<Vec<String>>;

    /// Decode one entry into a `(H, W)` or `(H, W, C)` pixel array.
    fn decode(&self, name: &str) -> Result<ArrayD<u8>>;

    /// Human readable origin, used in logs and error messages
    fn describe(&self) -> String;
}
