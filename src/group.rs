//! Variant grouping.
//!
//! Folds parsed filenames into one [`VariantGroup`] per logical key, with at
//! most one file per [`VariantTag`]. Grouping itself never fails; every
//! anomaly is recorded on the result instead:
//!
//! - names the parser could not place end up in [`Grouping::unrecognized`]
//! - two files claiming the same `(key, tag)` slot are a [`Collision`]; the
//!   later file in listing order replaces the earlier one
//! - groups that do not carry exactly the required tag set are split off by
//!   [`partition`] into [`IncompleteGroup`]s
//!
//! Keys and variants live in ordered maps, so the grouping of a
//! collision-free listing does not depend on the order files were listed in.

use crate::naming::ParsedName;
use crate::types::{FileRecord, VariantTag};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// All files belonging to one logical item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantGroup {
    pub logical_key: String,
    pub variants: BTreeMap<VariantTag, FileRecord>,
}

impl VariantGroup {
    pub fn new(logical_key: impl Into<String>) -> Self {
        Self {
            logical_key: logical_key.into(),
            variants: BTreeMap::new(),
        }
    }

    pub fn tags(&self) -> BTreeSet<VariantTag> {
        self.variants.keys().copied().collect()
    }

    pub fn get(&self, tag: VariantTag) -> Option<&FileRecord> {
        self.variants.get(&tag)
    }

    /// A group is complete when its tags equal the required set exactly.
    pub fn is_complete(&self, required: &BTreeSet<VariantTag>) -> bool {
        self.variants.len() == required.len() && self.variants.keys().all(|t| required.contains(t))
    }

    pub fn filenames(&self) -> Vec<String> {
        self.variants.values().map(|r| r.filename.clone()).collect()
    }
}

/// Two files resolved to the same `(logical_key, tag)` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub logical_key: String,
    pub tag: VariantTag,
    /// File that now occupies the slot (seen last).
    pub kept: String,
    /// File that was displaced.
    pub replaced: String,
}

/// Output of [`group`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    pub groups: BTreeMap<String, VariantGroup>,
    pub collisions: Vec<Collision>,
    /// Filenames the parser could not place. Excluded from `groups`.
    pub unrecognized: Vec<String>,
}

/// Fold parsed names into groups keyed by logical key.
pub fn group<I>(parsed: I) -> Grouping
where
    I: IntoIterator<Item = ParsedName>,
{
    let mut grouping = Grouping::default();

    for name in parsed {
        let Some(record) = name.record() else {
            log::warn!("skipping unrecognized filename: {}", name.filename);
            grouping.unrecognized.push(name.filename);
            continue;
        };

        let entry = grouping
            .groups
            .entry(name.logical_key.clone())
            .or_insert_with(|| VariantGroup::new(name.logical_key.clone()));

        if let Some(previous) = entry.variants.insert(name.tag, record) {
            log::warn!(
                "{} and {} both map to {} of '{}'; keeping {}",
                previous.filename,
                name.filename,
                name.tag,
                name.logical_key,
                name.filename
            );
            grouping.collisions.push(Collision {
                logical_key: name.logical_key,
                tag: name.tag,
                kept: name.filename,
                replaced: previous.filename,
            });
        }
    }

    grouping
}

/// A group excluded from the index because its tag set is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteGroup {
    pub logical_key: String,
    /// Required tags the group lacks.
    pub missing: Vec<VariantTag>,
    /// Tags the group has that the run does not ask for.
    pub unexpected: Vec<VariantTag>,
    pub files: Vec<String>,
}

impl IncompleteGroup {
    fn from_group(group: &VariantGroup, required: &BTreeSet<VariantTag>) -> Self {
        let tags = group.tags();
        Self {
            logical_key: group.logical_key.clone(),
            missing: required.difference(&tags).copied().collect(),
            unexpected: tags.difference(required).copied().collect(),
            files: group.filenames(),
        }
    }
}

/// Complete groups (sorted by logical key) and the ones left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub complete: Vec<VariantGroup>,
    pub incomplete: Vec<IncompleteGroup>,
}

/// Split groups by whether they carry exactly the `required` tags.
pub fn partition(
    groups: BTreeMap<String, VariantGroup>,
    required: &BTreeSet<VariantTag>,
) -> Partition {
    let mut result = Partition::default();
    for candidate in groups.into_values() {
        if candidate.is_complete(required) {
            result.complete.push(candidate);
        } else {
            let incomplete = IncompleteGroup::from_group(&candidate, required);
            log::warn!(
                "skipping '{}': missing {:?}, unexpected {:?}",
                incomplete.logical_key,
                incomplete.missing,
                incomplete.unexpected
            );
            result.incomplete.push(incomplete);
        }
    }
    result
}
