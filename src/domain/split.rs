// ============================================================
// Layer 3 — Dataset Split Role
// ============================================================
// A packed array is written next to the directory it was
// built from, named by appending a role marker:
//
//   data/glyphs_x       →  data/glyphs_x_train.npy
//                          data/glyphs_x_test.npy

use std::{
    fmt,
    ffi::OsString,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// The role a packed array plays in an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn suffix(&self) -> &'static str {
        match self {
            Split::Train => "_train",
            Split::Test  => "_test",
        }
    }

    /// `<directory><suffix>.npy`, a sibling of `directory`.
    pub fn packed_path(&self, directory: &Path) -> PathBuf {
        // Trailing separators would otherwise put the file inside the directory
        let trimmed: PathBuf = directory.components().collect();
        let mut name: OsString = trimmed.into_os_string();
        name.push(self.suffix());
        name.push(".npy");
        PathBuf::from(name)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Test  => write!(f, "test"),
        }
    }
}
