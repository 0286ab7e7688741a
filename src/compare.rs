//! Filename-level comparison of two folders.
//!
//! Used to check that a strip copied between drives (or exported twice)
//! holds the same files. Only names are compared; contents are not read.

use crate::catalog::{self, CatalogError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderComparison {
    pub first: PathBuf,
    pub second: PathBuf,
    pub common: Vec<String>,
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
}

impl FolderComparison {
    pub fn is_identical(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }
}

/// Compare the regular files directly inside two folders.
pub fn compare_folders(first: &Path, second: &Path) -> Result<FolderComparison, CatalogError> {
    let a: BTreeSet<String> = catalog::list_files(first)?.into_iter().collect();
    let b: BTreeSet<String> = catalog::list_files(second)?.into_iter().collect();

    Ok(FolderComparison {
        first: first.to_path_buf(),
        second: second.to_path_buf(),
        common: a.intersection(&b).cloned().collect(),
        only_in_first: a.difference(&b).cloned().collect(),
        only_in_second: b.difference(&a).cloned().collect(),
    })
}
