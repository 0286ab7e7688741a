//! Report rendering and writing.
//!
//! Three outputs, all rendered to a `String` first so the caller can hash,
//! print, or write them:
//!
//! - the JSON index ([`render_index_json`]), pretty-printed with two-space
//!   indentation and a trailing newline
//! - the gap report ([`render_gap_report`])
//! - the folder comparison ([`render_comparison`])
//!
//! ## Gap Report
//!
//! ```text
//! Present (continuous) segments:
//!    • 1 → 3
//!    • 7 → 8
//!
//! Missing (gap) segments:
//!    • 4 → 6
//! ```
//!
//! ## Writing
//!
//! Files are never written in place. [`stage`] writes the bytes to
//! `.{name}.tmp` in the target directory and [`StagedFile::persist`] renames
//! it over the target. A staged file that is dropped without being
//! persisted is removed, so an aborted run leaves neither a truncated target
//! nor a stray temporary behind.

use crate::compare::FolderComparison;
use crate::continuity::Continuity;
use crate::index::IndexEntry;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize index: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Render the index as pretty JSON.
///
/// The same entries always render to the same bytes.
pub fn render_index_json(entries: &[IndexEntry]) -> Result<String, ReportError> {
    let mut json = serde_json::to_string_pretty(entries)?;
    json.push('\n');
    Ok(json)
}

pub fn render_gap_report(continuity: &Continuity) -> String {
    let mut out = String::from("Present (continuous) segments:\n");
    for seg in &continuity.segments {
        let _ = writeln!(out, "   • {} → {}", seg.start, seg.end);
    }
    out.push_str("\nMissing (gap) segments:\n");
    for gap in &continuity.gaps {
        let _ = writeln!(out, "   • {} → {}", gap.start, gap.end);
    }
    out
}

pub fn render_comparison(cmp: &FolderComparison) -> String {
    let mut out = String::new();
    let sections = [
        ("Common files".to_string(), &cmp.common),
        (format!("Files only in {}", cmp.first.display()), &cmp.only_in_first),
        (format!("Files only in {}", cmp.second.display()), &cmp.only_in_second),
    ];
    for (i, (heading, names)) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{heading} ({}):", names.len());
        for name in names.iter() {
            let _ = writeln!(out, "    {name}");
        }
    }
    out
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Bytes written next to their target, waiting to be moved into place.
#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    persisted: bool,
}

fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.tmp"))
}

/// Write `contents` to the temporary sibling of `target`.
pub fn stage(target: &Path, contents: &[u8]) -> Result<StagedFile, ReportError> {
    let temp = temp_path_for(target);
    let staged = StagedFile {
        temp,
        target: target.to_path_buf(),
        persisted: false,
    };
    File::create(&staged.temp)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .map_err(|source| ReportError::Write {
            path: staged.temp.clone(),
            source,
        })?;
    Ok(staged)
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the temporary over the target.
    pub fn persist(mut self) -> Result<PathBuf, ReportError> {
        fs::rename(&self.temp, &self.target).map_err(|source| ReportError::Write {
            path: self.target.clone(),
            source,
        })?;
        self.persisted = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Stage and persist in one go.
pub fn write_atomic(target: &Path, contents: &[u8]) -> Result<PathBuf, ReportError> {
    stage(target, contents)?.persist()
}
