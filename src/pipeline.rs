//! End-to-end runs over one strip directory.
//!
//! Each entry point reads the directory listing once and threads the
//! [`Config`] through every stage explicitly:
//!
//! ```text
//! catalog → naming → group → partition → index (→ rename) → report
//! ```
//!
//! [`plan_index`] stops before anything is written, which is what `check`
//! uses. [`build_index`] carries on:
//!
//! 1. when renaming, the plan is checked: a single group without a usable
//!    ID ([`PipelineError::RenameBlocked`]), a target that would overwrite a
//!    file, or a leftover rename temporary stops the run
//! 2. the JSON is rendered and staged as a hidden temporary next to the
//!    output path, which proves the output location is writable
//! 3. when renaming, the files are moved
//! 4. the staged JSON is moved over the output path
//!
//! Any failure before step 4 leaves the previous index untouched. If step 4
//! itself fails, the renames of step 3 are reverted so the directory is back
//! to its original names.

use crate::catalog::{self, CatalogError};
use crate::compare::{self, FolderComparison};
use crate::config::{self, Config, ConfigError};
use crate::continuity::{self, Continuity};
use crate::group::{self, Collision, IncompleteGroup};
use crate::index::{self, AssignedGroup, IdFailure, IndexEntry};
use crate::naming::{NameParser, numeric_field};
use crate::rename::{self, Rename, RenameError};
use crate::report::{self, ReportError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Output directory does not exist: {0}")]
    OutputLocation(PathBuf),
    #[error("Rename aborted: {0} group(s) have no usable ID, no file was renamed")]
    RenameBlocked(usize),
    #[error(transparent)]
    Rename(#[from] RenameError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Everything a run skipped or overrode, for the console summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub unrecognized: Vec<String>,
    pub collisions: Vec<Collision>,
    pub incomplete: Vec<IncompleteGroup>,
    pub id_failures: Vec<IdFailure>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.unrecognized.is_empty()
            && self.collisions.is_empty()
            && self.incomplete.is_empty()
            && self.id_failures.is_empty()
    }
}

/// The outcome of a run, computed without touching the directory.
#[derive(Debug, Clone)]
pub struct IndexPlan {
    /// Every regular file in the source directory.
    pub listing: Vec<String>,
    /// Number of image files considered.
    pub images: usize,
    pub assigned: Vec<AssignedGroup>,
    pub entries: Vec<IndexEntry>,
    /// Empty unless renaming is enabled.
    pub renames: Vec<Rename>,
    pub diagnostics: Diagnostics,
}

/// Result of [`build_index`].
#[derive(Debug, Clone)]
pub struct IndexRun {
    pub entries: Vec<IndexEntry>,
    pub diagnostics: Diagnostics,
    pub renames: Vec<Rename>,
    pub output: PathBuf,
    /// SHA-256 of the written JSON.
    pub digest: String,
}

/// Result of [`find_gaps`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapRun {
    pub continuity: Continuity,
    /// Logical keys an identifier was read from.
    pub considered: usize,
    /// Logical keys without a numeric field.
    pub skipped: Vec<String>,
    /// Image files the parser could not place.
    pub unrecognized: Vec<String>,
}

/// Group, validate and assign IDs without writing anything.
pub fn plan_index(source: &Path, config: &Config) -> Result<IndexPlan, PipelineError> {
    let listing = catalog::list_files(source)?;
    let images = catalog::select_images(&listing);
    log::info!("found {} images in {}", images.len(), source.display());

    let parser = NameParser::from_config(&config.naming);
    let grouping = group::group(parser.parse_all(images.iter().map(|r| r.filename.as_str())));
    let split = group::partition(grouping.groups, &config.index.required_set());
    log::info!(
        "{} complete groups, {} incomplete",
        split.complete.len(),
        split.incomplete.len()
    );

    let built = index::build(split.complete, &config.index, &config.base_url);
    let (assigned, entries, renames) = if config.index.rename {
        let plan = rename::plan(built.assigned, &config.naming);
        let entries = index::project(&plan.groups, &config.base_url, &config.index.keys);
        (plan.groups, entries, plan.renames)
    } else {
        (built.assigned, built.entries, Vec::new())
    };

    Ok(IndexPlan {
        listing,
        images: images.len(),
        assigned,
        entries,
        renames,
        diagnostics: Diagnostics {
            unrecognized: grouping.unrecognized,
            collisions: grouping.collisions,
            incomplete: split.incomplete,
            id_failures: built.failures,
        },
    })
}

/// Plan, optionally rename, and write the JSON index.
pub fn build_index(source: &Path, config: &Config) -> Result<IndexRun, PipelineError> {
    let plan = plan_index(source, config)?;

    if config.index.rename {
        let failed = plan.diagnostics.id_failures.len();
        if failed > 0 {
            return Err(PipelineError::RenameBlocked(failed));
        }
        rename::check_conflicts(&plan.renames, &plan.listing)?;
    }

    let output = config::resolve_output(source, &config.output);
    ensure_parent_dir(&output)?;

    let json = report::render_index_json(&plan.entries)?;
    let staged = report::stage(&output, json.as_bytes())?;

    if config.index.rename {
        rename::apply(source, &plan.renames)?;
    }

    let output = match staged.persist() {
        Ok(output) => output,
        Err(err) => {
            if config.index.rename {
                if let Err(undo) = rename::revert(source, &plan.renames) {
                    log::error!("could not restore original names: {undo}");
                }
            }
            return Err(err.into());
        }
    };
    let digest = report::sha256_hex(json.as_bytes());
    log::info!(
        "wrote {} entries to {} (sha256 {})",
        plan.entries.len(),
        output.display(),
        digest
    );

    Ok(IndexRun {
        entries: plan.entries,
        diagnostics: plan.diagnostics,
        renames: plan.renames,
        output,
        digest,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() || parent.is_dir() => Ok(()),
        Some(parent) => Err(PipelineError::OutputLocation(parent.to_path_buf())),
        None => Err(PipelineError::OutputLocation(path.to_path_buf())),
    }
}

/// Continuity of the numeric identifiers found in the logical keys.
pub fn find_gaps(source: &Path, config: &Config) -> Result<GapRun, PipelineError> {
    let images = catalog::list_images(source)?;
    let parser = NameParser::from_config(&config.naming);

    let mut keys = BTreeSet::new();
    let mut unrecognized = Vec::new();
    for parsed in parser.parse_all(images.iter().map(|r| r.filename.as_str())) {
        if parsed.is_recognized() {
            keys.insert(parsed.logical_key);
        } else {
            log::warn!("unrecognized image name '{}', not counted", parsed.filename);
            unrecognized.push(parsed.filename);
        }
    }

    let mut ids = Vec::with_capacity(keys.len());
    let mut skipped = Vec::new();
    for key in &keys {
        match numeric_field(key, &config.gaps.delimiter, config.gaps.field) {
            Some((_, value)) => ids.push(value),
            None => {
                log::debug!("no numeric field in '{key}'");
                skipped.push(key.clone());
            }
        }
    }

    let continuity = continuity::analyze(&ids);
    log::info!(
        "{} segments, {} gaps over {} identifiers",
        continuity.segments.len(),
        continuity.gaps.len(),
        ids.len()
    );
    Ok(GapRun {
        continuity,
        considered: ids.len(),
        skipped,
        unrecognized,
    })
}

/// Write the gap report to `gaps.output`, resolved against `source`.
pub fn write_gap_report(
    source: &Path,
    config: &Config,
    run: &GapRun,
) -> Result<PathBuf, PipelineError> {
    let path = config::resolve_output(source, &config.gaps.output);
    ensure_parent_dir(&path)?;
    let text = report::render_gap_report(&run.continuity);
    Ok(report::write_atomic(&path, text.as_bytes())?)
}

/// Compare two folders and optionally write the comparison report.
pub fn compare(
    first: &Path,
    second: &Path,
    output: Option<&Path>,
) -> Result<FolderComparison, PipelineError> {
    let cmp = compare::compare_folders(first, second)?;
    if let Some(path) = output {
        ensure_parent_dir(path)?;
        report::write_atomic(path, report::render_comparison(&cmp).as_bytes())?;
    }
    Ok(cmp)
}
