// ============================================================
// Layer 3 — Code Point Range
// ============================================================
// The rasterizer walks an inclusive range of code points and
// writes one bitmap per code point. CodepointRange keeps the
// bounds together and owns the naming rule for glyph files.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// An inclusive range `[start, end]` of Unicode code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodepointRange {
    pub start: u32,
    pub end:   u32,
}

impl CodepointRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        ensure!(
            start <= end,
            "Code point range is empty: start U+{start:04X} is after end U+{end:04X}"
        );
        Ok(Self { start, end })
    }

    /// Number of code points in the range
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    /// File name for a code point's bitmap: the decimal code point
    /// followed by `.bmp`.
    pub fn file_name(codepoint: u32) -> String {
        format!("{codepoint}.bmp")
    }
}
