//! Index building: ID assignment and URL projection.
//!
//! Takes the complete groups of a run and turns them into the JSON records
//! the web viewer reads:
//!
//! ```json
//! [
//!   { "id": 1, "primary": "https://host/strip2/S2_00017.jpg", "mask": "https://host/strip2/S2_00017_mask.png" },
//!   { "id": 2, "primary": "...", "mask": "..." }
//! ]
//! ```
//!
//! ## ID Modes
//!
//! - **sequential**: groups sorted by logical key (plain string order) and
//!   numbered from 1.
//! - **extracted**: the ID is a numeric field of the logical key
//!   (`S2_00017` → `00017`). Groups are sorted by the *value* of that field
//!   so `2` comes before `10`. A group whose key has no such field, or whose
//!   ID is already taken by an earlier group, is left out and reported as an
//!   [`IdFailure`]. A failure never stops the other groups from being
//!   indexed.
//!
//! The [`IdFormat`] decides whether IDs are written as JSON numbers or as
//! zero-padded strings. One file never mixes the two.

use crate::config::{IdFormat, IdMode, IndexConfig, KeysConfig};
use crate::group::VariantGroup;
use crate::naming::numeric_field;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// An index ID as written to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryId {
    Number(u64),
    Text(String),
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntryId::Number(n) => serializer.serialize_u64(*n),
            EntryId::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

/// A complete group with its assigned ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedGroup {
    pub id: EntryId,
    /// Numeric value the entries are ordered by.
    pub sort_value: u64,
    pub group: VariantGroup,
}

/// Why a group got no ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IdFailureReason {
    /// Field `field` after splitting on `delimiter` is missing or not numeric.
    NoNumericField { delimiter: String, field: usize },
    /// Another group with a smaller logical key already holds this ID.
    DuplicateId { value: u64, holder: String },
}

impl fmt::Display for IdFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdFailureReason::NoNumericField { delimiter, field } => {
                write!(f, "no numeric field {field} when split on {delimiter:?}")
            }
            IdFailureReason::DuplicateId { value, holder } => {
                write!(f, "ID {value} already assigned to '{holder}'")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdFailure {
    pub logical_key: String,
    pub reason: IdFailureReason,
}

/// Assign IDs to complete groups and sort them into index order.
pub fn assign_ids(
    complete: Vec<VariantGroup>,
    config: &IndexConfig,
) -> (Vec<AssignedGroup>, Vec<IdFailure>) {
    match config.id_mode {
        IdMode::Sequential => (assign_sequential(complete, config), Vec::new()),
        IdMode::Extracted => assign_extracted(complete, config),
    }
}

fn assign_sequential(mut complete: Vec<VariantGroup>, config: &IndexConfig) -> Vec<AssignedGroup> {
    complete.sort_by(|a, b| a.logical_key.cmp(&b.logical_key));
    let width = config
        .pad_width
        .unwrap_or_else(|| complete.len().to_string().len());

    complete
        .into_iter()
        .zip(1u64..)
        .map(|(group, seq)| {
            let id = match config.id_format {
                IdFormat::Number => EntryId::Number(seq),
                IdFormat::Padded => EntryId::Text(format!("{seq:0width$}")),
            };
            AssignedGroup {
                id,
                sort_value: seq,
                group,
            }
        })
        .collect()
}

fn assign_extracted(
    complete: Vec<VariantGroup>,
    config: &IndexConfig,
) -> (Vec<AssignedGroup>, Vec<IdFailure>) {
    let extract = &config.extract;
    let mut failures = Vec::new();
    let mut candidates: Vec<(u64, String, VariantGroup)> = Vec::new();

    for group in complete {
        match numeric_field(&group.logical_key, &extract.delimiter, extract.field) {
            Some((text, value)) => candidates.push((value, text.to_string(), group)),
            None => {
                log::warn!(
                    "cannot extract an ID from '{}', skipping",
                    group.logical_key
                );
                failures.push(IdFailure {
                    logical_key: group.logical_key,
                    reason: IdFailureReason::NoNumericField {
                        delimiter: extract.delimiter.clone(),
                        field: extract.field,
                    },
                });
            }
        }
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.2.logical_key.cmp(&b.2.logical_key)));

    let mut assigned: Vec<AssignedGroup> = Vec::with_capacity(candidates.len());
    for (value, text, group) in candidates {
        if let Some(holder) = assigned.last().filter(|prev| prev.sort_value == value) {
            log::warn!(
                "'{}' resolves to ID {} already held by '{}', skipping",
                group.logical_key,
                value,
                holder.group.logical_key
            );
            failures.push(IdFailure {
                logical_key: group.logical_key,
                reason: IdFailureReason::DuplicateId {
                    value,
                    holder: holder.group.logical_key.clone(),
                },
            });
            continue;
        }
        let id = match (config.id_format, config.pad_width) {
            (IdFormat::Number, _) => EntryId::Number(value),
            (IdFormat::Padded, Some(width)) => EntryId::Text(format!("{value:0width$}")),
            (IdFormat::Padded, None) => EntryId::Text(text),
        };
        assigned.push(AssignedGroup {
            id,
            sort_value: value,
            group,
        });
    }

    failures.sort_by(|a, b| a.logical_key.cmp(&b.logical_key));
    (assigned, failures)
}

/// One record of the JSON index.
///
/// `urls` holds `(json key, url)` pairs in variant tag order. Serialization
/// writes `id` first, then the URLs in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: EntryId,
    pub urls: Vec<(String, String)>,
}

impl IndexEntry {
    pub fn url(&self, key: &str) -> Option<&str> {
        self.urls
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, url)| url.as_str())
    }
}

impl Serialize for IndexEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.urls.len()))?;
        map.serialize_entry("id", &self.id)?;
        for (key, url) in &self.urls {
            map.serialize_entry(key, url)?;
        }
        map.end()
    }
}

/// `{base_url}/{filename}`, tolerating a trailing slash on the base.
///
/// An empty base yields the bare filename.
pub fn asset_url(base_url: &str, filename: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        filename.to_string()
    } else {
        format!("{base}/{filename}")
    }
}

/// Project assigned groups into index entries.
pub fn project(assigned: &[AssignedGroup], base_url: &str, keys: &KeysConfig) -> Vec<IndexEntry> {
    assigned
        .iter()
        .map(|a| IndexEntry {
            id: a.id.clone(),
            urls: a
                .group
                .variants
                .iter()
                .map(|(tag, record)| {
                    (
                        keys.key_for(*tag).to_string(),
                        asset_url(base_url, &record.filename),
                    )
                })
                .collect(),
        })
        .collect()
}

/// Result of [`build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuild {
    pub assigned: Vec<AssignedGroup>,
    pub entries: Vec<IndexEntry>,
    pub failures: Vec<IdFailure>,
}

/// Assign IDs and project URLs in one step.
pub fn build(complete: Vec<VariantGroup>, config: &IndexConfig, base_url: &str) -> IndexBuild {
    let (assigned, failures) = assign_ids(complete, config);
    let entries = project(&assigned, base_url, &config.keys);
    IndexBuild {
        assigned,
        entries,
        failures,
    }
}
