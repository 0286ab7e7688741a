//! Rename pass: give every indexed file a name derived from its ID.
//!
//! ```text
//! S3_02858.jpg       →  02858.jpg
//! S3_02858_mask.png  →  02858_mask.png
//! ```
//!
//! The primary file becomes `{id}.{ext}`, every other variant
//! `{id}{suffix}.{ext}` with the first configured suffix for its tag. The
//! extension keeps the spelling it had on disk.
//!
//! Everything is decided up front. [`plan`] computes the target names,
//! [`check_conflicts`] rejects any plan that would overwrite a file, and
//! only then does [`apply`] touch the directory. `apply` moves every source
//! to a hidden temporary first and then moves the temporaries to their
//! targets, so swaps and chains (`1.jpg → 2.jpg`, `2.jpg → 3.jpg`) work. If
//! anything fails, files already moved are put back where they were. A
//! leftover temporary from an interrupted run blocks the plan rather than
//! being overwritten. [`revert`] undoes a completed pass when a later step
//! of the run fails.

use crate::config::NamingConfig;
use crate::index::{AssignedGroup, EntryId};
use crate::naming::NameParser;
use crate::types::{FileRecord, VariantTag};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Rename target {target} already exists (would be overwritten by {source_name})")]
    TargetExists { target: String, source_name: String },
    #[error("Leftover rename temporary {name} is in the way; move it aside and rerun")]
    StagingExists { name: String },
    #[error("{first} and {second} would both be renamed to {target}")]
    DuplicateTarget {
        target: String,
        first: String,
        second: String,
    },
    #[error("Failed to rename {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One file move inside the source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Renames to perform plus the groups as they will look afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    /// Only files whose name actually changes.
    pub renames: Vec<Rename>,
    pub groups: Vec<AssignedGroup>,
}

/// Target filename for one variant of a group.
pub fn target_name(
    id: &EntryId,
    tag: VariantTag,
    record: &FileRecord,
    naming: &NamingConfig,
) -> String {
    let suffix = NameParser::canonical_suffix(naming, tag);
    format!("{id}{suffix}.{}", record.ext_text())
}

/// Compute target names for every file of every assigned group.
pub fn plan(assigned: Vec<AssignedGroup>, naming: &NamingConfig) -> RenamePlan {
    let mut renames = Vec::new();
    let groups = assigned
        .into_iter()
        .map(|mut a| {
            for (tag, record) in a.group.variants.iter_mut() {
                let target = target_name(&a.id, *tag, record, naming);
                if target != record.filename {
                    renames.push(Rename {
                        from: std::mem::replace(&mut record.filename, target.clone()),
                        to: target,
                    });
                }
            }
            a
        })
        .collect();
    RenamePlan { renames, groups }
}

/// Reject plans that would clobber a file.
///
/// `listing` is every file currently in the directory. A target may only
/// exist already if it is itself being renamed away by the same plan. The
/// hidden temporaries [`apply`] moves through must not exist at all.
pub fn check_conflicts(renames: &[Rename], listing: &[String]) -> Result<(), RenameError> {
    let sources: BTreeSet<&str> = renames.iter().map(|r| r.from.as_str()).collect();
    let existing: BTreeSet<&str> = listing.iter().map(String::as_str).collect();
    let mut targets: BTreeMap<&str, &str> = BTreeMap::new();

    for (i, rename) in renames.iter().enumerate() {
        let staging = staging_name(i);
        if existing.contains(staging.as_str()) {
            return Err(RenameError::StagingExists { name: staging });
        }
        if let Some(first) = targets.insert(&rename.to, &rename.from) {
            return Err(RenameError::DuplicateTarget {
                target: rename.to.clone(),
                first: first.to_string(),
                second: rename.from.clone(),
            });
        }
        if existing.contains(rename.to.as_str()) && !sources.contains(rename.to.as_str()) {
            return Err(RenameError::TargetExists {
                target: rename.to.clone(),
                source_name: rename.from.clone(),
            });
        }
    }
    Ok(())
}

fn staging_name(index: usize) -> String {
    format!(".strip-index-rename-{index}.tmp")
}

fn move_file(from: &Path, to: &Path) -> Result<(), RenameError> {
    fs::rename(from, to).map_err(|source| RenameError::Io {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// Put files back after a failed pass. Best effort: failures are logged.
fn restore(moves: &[(PathBuf, PathBuf)]) {
    for (original, current) in moves.iter().rev() {
        if let Err(err) = fs::rename(current, original) {
            log::error!(
                "could not restore {} from {}: {err}",
                original.display(),
                current.display()
            );
        }
    }
}

/// Execute a checked plan inside `dir`.
pub fn apply(dir: &Path, renames: &[Rename]) -> Result<(), RenameError> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(renames.len());
    for (i, rename) in renames.iter().enumerate() {
        let from = dir.join(&rename.from);
        let temp = dir.join(staging_name(i));
        if let Err(err) = move_file(&from, &temp) {
            restore(&staged);
            return Err(err);
        }
        staged.push((from, temp));
    }

    let mut placed: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(renames.len());
    for (rename, (_, temp)) in renames.iter().zip(&staged) {
        let to = dir.join(&rename.to);
        if let Err(err) = move_file(temp, &to) {
            // Targets back to temporaries, then every temporary back to its source.
            restore(&placed);
            restore(&staged);
            return Err(err);
        }
        log::debug!("renamed {} -> {}", rename.from, rename.to);
        placed.push((temp.clone(), to));
    }

    log::info!("renamed {} files in {}", renames.len(), dir.display());
    Ok(())
}

/// Undo a pass that [`apply`] completed.
pub fn revert(dir: &Path, renames: &[Rename]) -> Result<(), RenameError> {
    let inverse: Vec<Rename> = renames
        .iter()
        .map(|r| Rename {
            from: r.to.clone(),
            to: r.from.clone(),
        })
        .collect();
    apply(dir, &inverse)?;
    log::warn!("restored {} original names in {}", renames.len(), dir.display());
    Ok(())
}
