//! Shared test utilities for the strip-index test suite.
//!
//! Provides fixture builders for strip directories, ready-made complete
//! groups, and lookup helpers over index entries that panic with a clear
//! message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = strip_fixture(&["A_1.jpg", "A_1_mask.jpg", "A_2.jpg"]);
//! let run = build_index(tmp.path(), &Config::default()).unwrap();
//!
//! assert_eq!(entry_ids(&run.entries), vec!["1"]);
//! let entry = find_entry(&run.entries, "1");
//! assert_eq!(entry.url("primary"), Some("A_1.jpg"));
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::group::VariantGroup;
use crate::index::IndexEntry;
use crate::types::{FileRecord, VariantTag};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create one small file per name inside `dir`.
///
/// The content is the filename itself so renames can be traced.
pub fn write_files(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

/// A temp strip directory holding `names`.
pub fn strip_fixture(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), names);
    tmp
}

/// Complete primary+mask groups: `{key}.jpg` and `{key}_mask.png`.
pub fn complete_groups(keys: &[&str]) -> Vec<VariantGroup> {
    keys.iter()
        .map(|key| {
            let mut group = VariantGroup::new(*key);
            for (tag, name) in [
                (VariantTag::Primary, format!("{key}.jpg")),
                (VariantTag::Mask, format!("{key}_mask.png")),
            ] {
                let record = FileRecord::from_filename(&name)
                    .unwrap_or_else(|| panic!("'{name}' is not an image name"));
                group.variants.insert(tag, record);
            }
            group
        })
        .collect()
}

// =========================================================================
// Entry lookups
// =========================================================================

/// All entry IDs as strings, in index order.
pub fn entry_ids(entries: &[IndexEntry]) -> Vec<String> {
    entries.iter().map(|e| e.id.to_string()).collect()
}

/// Find an entry by its ID text. Panics if not found.
pub fn find_entry<'a>(entries: &'a [IndexEntry], id: &str) -> &'a IndexEntry {
    entries
        .iter()
        .find(|e| e.id.to_string() == id)
        .unwrap_or_else(|| {
            let ids = entry_ids(entries);
            panic!("entry '{id}' not found. Available: {ids:?}")
        })
}

/// Sorted file names currently in `dir`, hidden files included.
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
