//! Section merge rules
//!
//! Event hook lists are append-only: existing entries keep their order
//! (internal duplicates collapse to the first occurrence) and desired
//! entries are appended when their signature is new. Tooling commands are
//! overwritten by key so packaged definitions always win.

use std::collections::HashSet;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::document::ConfigDocument;
use crate::error::Result;
use crate::plan::{EVENTS_KEY, MergePlan, TOOLING_KEY};
use crate::signature::{Signature, signature};

/// Result of merging one list section.
#[derive(Debug, Clone, PartialEq)]
pub struct ListMerge {
    pub entries: Vec<Value>,
    /// Desired entries that were appended
    pub added: usize,
    /// Existing entries dropped as duplicates of an earlier one
    pub duplicates_removed: usize,
}

/// Merge `desired` into `existing` without duplicating any signature.
pub fn merge_list(existing: &[Value], desired: &[Value]) -> ListMerge {
    let mut seen: HashSet<Signature> = HashSet::with_capacity(existing.len() + desired.len());
    let mut entries = Vec::with_capacity(existing.len() + desired.len());

    for item in existing {
        if seen.insert(signature(item)) {
            entries.push(item.clone());
        }
    }
    let duplicates_removed = existing.len() - entries.len();

    let mut added = 0;
    for item in desired {
        if seen.insert(signature(item)) {
            entries.push(item.clone());
            added += 1;
        }
    }

    ListMerge {
        entries,
        added,
        duplicates_removed,
    }
}

/// Overwrite every key of `desired` into a copy of `existing`.
///
/// Existing keys keep their position; new keys are appended in `desired`
/// order. Keys only in `existing` pass through unchanged.
pub fn merge_map(existing: &Mapping, desired: &Mapping) -> Mapping {
    let mut merged = existing.clone();
    for (key, value) in desired {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Counts collected while applying a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// `(event name, hooks appended)` in plan order
    pub hooks_added: Vec<(String, usize)>,
    /// Duplicate hooks dropped from existing lists
    pub duplicates_removed: usize,
    /// Tooling commands written (new or overwritten)
    pub commands_written: usize,
    /// Tooling commands that did not exist before
    pub commands_created: usize,
}

impl MergeStats {
    /// Total hooks appended across all events.
    pub fn hooks_added(&self) -> usize {
        self.hooks_added.iter().map(|(_, count)| count).sum()
    }
}

/// Apply `plan` to `doc` in place.
///
/// Ensures `events`, every planned event list and `tooling` exist before
/// merging. A section of the wrong kind aborts with [`Error::Shape`] and
/// leaves earlier sections merged, so callers must discard `doc` on error.
///
/// [`Error::Shape`]: crate::Error::Shape
pub fn apply(doc: &mut ConfigDocument, plan: &MergePlan) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    doc.mapping_mut(EVENTS_KEY)?;
    for (event, entries) in plan.events() {
        let desired: Vec<Value> = entries.iter().map(|entry| entry.to_value()).collect();
        let list = doc.nested_sequence_mut(EVENTS_KEY, event)?;

        let merged = merge_list(list, &desired);
        debug!(
            event,
            added = merged.added,
            duplicates_removed = merged.duplicates_removed,
            "merged event hooks"
        );
        *list = merged.entries;
        stats.hooks_added.push((event.to_string(), merged.added));
        stats.duplicates_removed += merged.duplicates_removed;
    }

    let desired_tooling = plan.tooling_mapping();
    let tooling = doc.mapping_mut(TOOLING_KEY)?;
    stats.commands_created = desired_tooling
        .keys()
        .filter(|key| !tooling.contains_key(*key))
        .count();
    stats.commands_written = desired_tooling.len();
    *tooling = merge_map(tooling, &desired_tooling);
    debug!(
        written = stats.commands_written,
        created = stats.commands_created,
        "merged tooling commands"
    );

    Ok(stats)
}
