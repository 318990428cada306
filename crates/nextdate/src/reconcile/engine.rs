//! N-way reconciliation over per-source indices.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::calendar::DateKey;
use crate::index::{MultiSourceIndex, SourceIndex};
use crate::record::{Expected, SourceTag};

use super::outcome::{Reconciliation, ReconciliationOutcome};

/// Classify every key in the union of `indices`.
///
/// Outcomes come back in key order and sources inside each outcome in tag
/// order, so the input order of `indices` never changes the result. A tag
/// given twice is merged, with the later index winning on shared keys.
pub fn reconcile(indices: &[(SourceTag, SourceIndex)]) -> Reconciliation {
    let mut merged: BTreeMap<&SourceTag, BTreeMap<&DateKey, &Expected>> = BTreeMap::new();
    for (source, index) in indices {
        if merged.contains_key(source) {
            warn!(source = %source, "source given more than once; merging, later entries win");
        }
        merged.entry(source).or_default().extend(index.iter());
    }

    let keys: BTreeSet<&DateKey> = merged
        .values()
        .flat_map(|entries| entries.keys().copied())
        .collect();

    let outcomes: Vec<ReconciliationOutcome> = keys
        .into_iter()
        .map(|key| {
            let values: IndexMap<SourceTag, Expected> = merged
                .iter()
                .filter_map(|(source, entries)| {
                    entries
                        .get(key)
                        .map(|value| ((*source).clone(), (*value).clone()))
                })
                .collect();
            classify(*key, values)
        })
        .collect();

    let sources: Vec<SourceTag> = merged.keys().map(|source| (*source).clone()).collect();
    debug!(sources = sources.len(), keys = outcomes.len(), "reconciled");

    Reconciliation { sources, outcomes }
}

/// Reconcile every source held by a multi-source index.
pub fn reconcile_index(index: &MultiSourceIndex) -> Reconciliation {
    reconcile(&index.split_by_source())
}

fn classify(key: DateKey, mut values: IndexMap<SourceTag, Expected>) -> ReconciliationOutcome {
    if values.len() == 1 {
        // Non-empty: the key came from at least one source.
        if let Some((source, value)) = values.pop() {
            return ReconciliationOutcome::OnlyIn { key, source, value };
        }
    }

    let mut distinct = values.values();
    let first = distinct.next();
    let all_equal = distinct.all(|value| Some(value) == first);

    match (all_equal, first.cloned()) {
        (true, Some(value)) => ReconciliationOutcome::Match {
            key,
            sources: values.into_keys().collect(),
            value,
        },
        _ => ReconciliationOutcome::Mismatch { key, values },
    }
}
