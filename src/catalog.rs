//! Directory listing for one strip.
//!
//! The catalog reads the source directory exactly once per run and hands
//! back plain filename records. It does not recurse: a strip is a flat
//! folder of images, and anything in subdirectories belongs to some other
//! strip.
//!
//! Two listings are offered:
//!
//! - [`list_images`]: regular files whose extension is in the image
//!   whitelist (`jpg jpeg png bmp tif tiff gif`, any case). Hidden images
//!   are listed too; the parser rejects them as unknown so they show up in
//!   the run's diagnostics instead of vanishing.
//! - [`list_files`]: every regular file name, for the folder comparison.
//!
//! Both are sorted by filename so that downstream last-write-wins behavior
//! is reproducible between runs.

use crate::types::FileRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Source is not a directory: {0}")]
    InvalidDirectory(PathBuf),
    #[error("Failed to list {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// List image files directly inside `dir`.
pub fn list_images(dir: &Path) -> Result<Vec<FileRecord>, CatalogError> {
    let names = list_files(dir)?;
    Ok(select_images(&names))
}

/// Keep the image files of an existing listing.
pub fn select_images(names: &[String]) -> Vec<FileRecord> {
    names
        .iter()
        .filter_map(|name| FileRecord::from_filename(name))
        .collect()
}

/// List every regular file name directly inside `dir`, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<String>, CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::InvalidDirectory(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| CatalogError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    log::debug!("listed {} files in {}", names.len(), dir.display());
    Ok(names)
}
