//! # Strip Index
//!
//! Indexes a directory of strip images for a web viewer. Every item in a
//! strip is a primary image plus derived variants (a mask, sometimes an
//! annotation) that share its name and add a suffix. This crate pairs the
//! variants, assigns each item an ID, and writes a JSON index the viewer can
//! page through.
//!
//! # Architecture: One Pass, One Snapshot
//!
//! A run lists the directory once and pushes that snapshot through a chain
//! of pure stages. Only the last step writes anything:
//!
//! ```text
//! 1. Catalog    strip/        →  file records      (flat listing, image whitelist)
//! 2. Naming     file records  →  parsed names      (suffix table → key + tag)
//! 3. Group      parsed names  →  variant groups    (complete / incomplete)
//! 4. Index      groups        →  entries           (IDs + URLs, optional renames)
//! 5. Report     entries       →  index.json        (staged, then moved into place)
//! ```
//!
//! Every stage returns its anomalies alongside its result instead of
//! failing, so one odd filename never costs the rest of the strip. Only a
//! missing source directory, an unusable output location, or an unsafe
//! rename stops a run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Lists the regular files of one directory, sorted |
//! | [`naming`] | Suffix-table filename parser and numeric field extraction |
//! | [`group`] | Folds parsed names into variant groups, splits complete from incomplete |
//! | [`index`] | ID assignment (sequential or extracted) and URL projection |
//! | [`rename`] | Optional rename-to-ID pass with conflict checks and rollback |
//! | [`continuity`] | Contiguous segments and gaps in a set of identifiers |
//! | [`compare`] | Filename-level diff of two folders |
//! | [`report`] | JSON, gap and comparison rendering; staged writes; SHA-256 |
//! | [`pipeline`] | End-to-end runs wiring the stages together |
//! | [`config`] | Layered `strip-index.toml` loading, validation and overrides |
//! | [`types`] | Shared types: `FileRecord`, `VariantTag`, `ImageExtension` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Suffix Table, Not Patterns
//!
//! Variants are recognized by a case-insensitive suffix table (`_mask`,
//! `_an`, …) configured per run. The longest matching suffix wins, and a
//! name with no matching suffix is the primary. Adding a new vocabulary is a
//! config change, not a code change.
//!
//! ## Exact Completeness
//!
//! A group is indexed only when its tags equal the required set. A group
//! with an extra annotation in a primary+mask run is reported rather than
//! silently trimmed, since it usually means two runs were mixed in one
//! folder.
//!
//! ## Numeric Order for Extracted IDs
//!
//! Extracted IDs sort by value, not by text, so `S_2` comes before `S_10`.
//! Leading zeros are kept in padded output (`02858`) but never decide
//! order.
//!
//! ## Nothing Half-Written
//!
//! The index is written to a hidden temporary next to its target and moved
//! into place last. With renaming on, the whole plan is checked before the
//! first file moves, and a failed move puts every file back. A run either
//! finishes or leaves the directory as it found it.

pub mod catalog;
pub mod compare;
pub mod config;
pub mod continuity;
pub mod group;
pub mod index;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod rename;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
