//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output is **entry-centric, not file-centric**. Each index entry leads with
//! its positional index and ID; the URLs it points at follow as indented
//! context lines. Everything a run left out is listed under a single
//! `Skipped` section, grouped by reason, so a glance tells whether the strip
//! is clean.
//!
//! # Output Format
//!
//! ## Index
//!
//! ```text
//! Entries
//! 001 1
//!     primary: https://host/strip2/A_1.jpg
//!     mask: https://host/strip2/A_1_mask.jpg
//!
//! Skipped
//!     incomplete: A_2 (missing mask)
//!
//! Wrote 1 entry → /data/strip2/index.json
//!     sha256: 3f0c…
//! ```
//!
//! ## Check
//!
//! Same entry and skip sections as `index`, preceded by counts and followed
//! by the renames that would run.
//!
//! ## Gaps
//!
//! ```text
//! Present (continuous) segments:
//!    • 1 → 3
//!
//! Missing (gap) segments:
//!    • 4 → 6
//!
//! Report → /data/strip2/gaps.txt
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compare::FolderComparison;
use crate::index::IndexEntry;
use crate::pipeline::{Diagnostics, GapRun, IndexPlan, IndexRun};
use crate::rename::Rename;
use crate::report;
use crate::types::VariantTag;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

fn tag_list(tags: &[VariantTag]) -> String {
    tags.iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Entry header plus one indented line per URL.
///
/// ```text
/// 001 02858
///     primary: S3_02858.jpg
///     mask: S3_02858_mask.png
/// ```
fn format_entries(entries: &[IndexEntry]) -> Vec<String> {
    let mut lines = vec!["Entries".to_string()];
    if entries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.id));
        for (key, url) in &entry.urls {
            lines.push(format!("{}{}: {}", indent(1), key, url));
        }
    }
    lines
}

/// The `Skipped` section. Empty when nothing was skipped.
fn format_diagnostics(diag: &Diagnostics) -> Vec<String> {
    if diag.is_clean() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Skipped".to_string()];
    for name in &diag.unrecognized {
        lines.push(format!("{}unrecognized: {}", indent(1), name));
    }
    for c in &diag.collisions {
        lines.push(format!(
            "{}collision: {} {} (kept {}, dropped {})",
            indent(1),
            c.logical_key,
            c.tag,
            c.kept,
            c.replaced
        ));
    }
    for group in &diag.incomplete {
        let mut detail = Vec::new();
        if !group.missing.is_empty() {
            detail.push(format!("missing {}", tag_list(&group.missing)));
        }
        if !group.unexpected.is_empty() {
            detail.push(format!("unexpected {}", tag_list(&group.unexpected)));
        }
        lines.push(format!(
            "{}incomplete: {} ({})",
            indent(1),
            group.logical_key,
            detail.join("; ")
        ));
    }
    for failure in &diag.id_failures {
        lines.push(format!(
            "{}no id: {} ({})",
            indent(1),
            failure.logical_key,
            failure.reason
        ));
    }
    lines
}

fn format_renames(renames: &[Rename], heading: &str) -> Vec<String> {
    if renames.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), format!("{heading} ({})", renames.len())];
    for r in renames {
        lines.push(format!("{}{} → {}", indent(1), r.from, r.to));
    }
    lines
}

// ============================================================================
// index
// ============================================================================

pub fn format_index_output(run: &IndexRun) -> Vec<String> {
    let mut lines = format_entries(&run.entries);
    lines.extend(format_diagnostics(&run.diagnostics));
    lines.extend(format_renames(&run.renames, "Renamed"));
    lines.push(String::new());
    lines.push(format!(
        "Wrote {} → {}",
        plural(run.entries.len(), "entry", "entries"),
        run.output.display()
    ));
    lines.push(format!("{}sha256: {}", indent(1), run.digest));
    lines
}

pub fn print_index_output(run: &IndexRun) {
    for line in format_index_output(run) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_check_output(plan: &IndexPlan) -> Vec<String> {
    let mut lines = vec![
        format!("Images: {}", plan.images),
        format!("Indexed: {}", plan.entries.len()),
        String::new(),
    ];
    lines.extend(format_entries(&plan.entries));
    lines.extend(format_diagnostics(&plan.diagnostics));
    lines.extend(format_renames(&plan.renames, "Would rename"));
    lines
}

pub fn print_check_output(plan: &IndexPlan) {
    for line in format_check_output(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// gaps
// ============================================================================

pub fn format_gap_output(run: &GapRun, written: Option<&Path>) -> Vec<String> {
    let mut lines: Vec<String> = report::render_gap_report(&run.continuity)
        .lines()
        .map(str::to_string)
        .collect();
    if !run.skipped.is_empty() {
        lines.push(String::new());
        lines.push(format!("Skipped ({} without a numeric field)", run.skipped.len()));
        for key in &run.skipped {
            lines.push(format!("{}{}", indent(1), key));
        }
    }
    if !run.unrecognized.is_empty() {
        lines.push(String::new());
        lines.push(format!("Unrecognized ({})", run.unrecognized.len()));
        for name in &run.unrecognized {
            lines.push(format!("{}{}", indent(1), name));
        }
    }
    if let Some(path) = written {
        lines.push(String::new());
        lines.push(format!("Report → {}", path.display()));
    }
    lines
}

pub fn print_gap_output(run: &GapRun, written: Option<&Path>) {
    for line in format_gap_output(run, written) {
        println!("{}", line);
    }
}

// ============================================================================
// compare
// ============================================================================

pub fn format_compare_output(cmp: &FolderComparison, written: Option<&Path>) -> Vec<String> {
    let mut lines = vec![
        format!("Files in common: {}", cmp.common.len()),
        format!(
            "Only in {}: {}",
            cmp.first.display(),
            cmp.only_in_first.len()
        ),
        format!(
            "Only in {}: {}",
            cmp.second.display(),
            cmp.only_in_second.len()
        ),
    ];
    match written {
        Some(path) => {
            lines.push(String::new());
            lines.push(format!("Report → {}", path.display()));
        }
        None if !cmp.is_identical() => {
            lines.push(String::new());
            lines.extend(report::render_comparison(cmp).lines().map(str::to_string));
        }
        None => {}
    }
    lines
}

pub fn print_compare_output(cmp: &FolderComparison, written: Option<&Path>) {
    for line in format_compare_output(cmp, written) {
        println!("{}", line);
    }
}
