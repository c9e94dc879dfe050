//! # Storage Layer
//!
//! [`ShelfStore`] owns the shelf root directory and is the only code that writes
//! below it. Every operation is addressed by item id and reads the filesystem
//! fresh; nothing is cached between calls, so the store always reflects what is
//! on disk right now.
//!
//! ## Storage Format
//!
//! ```text
//! <shelf root>/
//! ├── book_a/
//! │   ├── book_a.json     # Item metadata (pretty JSON, camelCase keys)
//! │   ├── book_a.txt      # Extracted plain text (UTF-8)
//! │   └── book_a.pdf      # Copy of the original (pdf and epub items only)
//! └── notes/
//!     ├── notes.json
//!     └── notes.txt       # For text items this is both original and extracted form
//! ```
//!
//! ## Write Ordering
//!
//! - `add` assembles the item in a hidden `.staging-*` directory and renames it
//!   into place, so an item appears with all of its files or not at all. A
//!   failure removes the staging directory before the error is returned.
//! - `update` writes the metadata to a temporary file in the item directory and
//!   renames it over `<id>.json`; readers never observe a half-written file.
//!
//! There is no locking. Two processes working on one shelf root at the same time
//! may interleave unsafely.

pub mod fs;

pub use fs::{Items, ShelfStore};

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Items that passed every check.
    pub healthy: usize,
    /// Staging directories left behind by interrupted adds, now removed.
    pub removed_staging_dirs: usize,
    /// Temporary metadata files left behind by interrupted edits, now removed.
    pub removed_temp_files: usize,
    /// Items that failed a check, with the reason. These are reported, not repaired.
    pub corrupt: Vec<(String, String)>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.removed_staging_dirs == 0 && self.removed_temp_files == 0 && self.corrupt.is_empty()
    }
}
