//! Multi-source index: expected values grouped by date key, then by source.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::DateKey;
use crate::record::{Expected, SourceTag, TestCase};

/// One source's view: key to expected value.
pub type SourceIndex = BTreeMap<DateKey, Expected>;

/// A (source, key) pair that appeared more than once. The later row won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub source: SourceTag,
    pub key: DateKey,
    pub replaced: Expected,
    pub kept: Expected,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

/// Expected values keyed by date, then by source (sources in first-seen order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSourceIndex {
    entries: BTreeMap<DateKey, IndexMap<SourceTag, Expected>>,
    sources: Vec<SourceTag>,
}

impl MultiSourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a case. Returns the value it replaced, if this source already had the key.
    pub fn insert(&mut self, case: TestCase) -> Option<Expected> {
        if !self.sources.contains(&case.source) {
            self.sources.push(case.source.clone());
        }
        self.entries
            .entry(case.key)
            .or_default()
            .insert(case.source, case.expected)
    }

    /// Per-source values for one key.
    pub fn get(&self, key: &DateKey) -> Option<&IndexMap<SourceTag, Expected>> {
        self.entries.get(key)
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &IndexMap<SourceTag, Expected>)> {
        self.entries.iter()
    }

    /// Sources in the order they were first seen.
    pub fn sources(&self) -> &[SourceTag] {
        &self.sources
    }

    /// Number of distinct keys across all sources.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split into one index per source, for reconciliation.
    pub fn split_by_source(&self) -> Vec<(SourceTag, SourceIndex)> {
        self.sources
            .iter()
            .map(|source| {
                let index: SourceIndex = self
                    .entries
                    .iter()
                    .filter_map(|(key, values)| {
                        values.get(source).map(|expected| (*key, expected.clone()))
                    })
                    .collect();
                (source.clone(), index)
            })
            .collect()
    }
}

/// Result of building an index: the index plus every last-write-wins overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexBuild {
    pub index: MultiSourceIndex,
    pub duplicates: Vec<DuplicateKey>,
}

/// Group test cases by key and source.
///
/// If one source supplies the same key twice, the later case wins and the
/// overwrite is recorded in [`IndexBuild::duplicates`].
pub fn build_index(cases: impl IntoIterator<Item = TestCase>) -> IndexBuild {
    let mut build = IndexBuild::default();

    for case in cases {
        let source = case.source.clone();
        let key = case.key;
        let row = case.row;
        let kept = case.expected.clone();

        if let Some(replaced) = build.index.insert(case) {
            warn!(
                source = %source,
                key = %key,
                replaced = %replaced,
                kept = %kept,
                "duplicate key in source; later row wins"
            );
            build.duplicates.push(DuplicateKey {
                source,
                key,
                replaced,
                kept,
                row,
            });
        }
    }

    build
}

/// Build a single-source index, reporting duplicates the same way.
pub fn source_index(cases: impl IntoIterator<Item = TestCase>) -> (SourceIndex, Vec<DuplicateKey>) {
    let build = build_index(cases);
    let mut split = build.index.split_by_source();
    let index = match split.len() {
        0 => SourceIndex::new(),
        1 => split.remove(0).1,
        _ => split.into_iter().flat_map(|(_, index)| index).collect(),
    };
    (index, build.duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarResult;

    fn case(source: &str, day: i64, month: i64, year: i64, expected: CalendarResult) -> TestCase {
        TestCase::new(DateKey::new(day, month, year), expected, SourceTag::new(source))
    }

    #[test]
    fn test_sources_collide_on_key() {
        let next = CalendarResult::Valid(DateKey::new(1, 3, 2023));
        let build = build_index(vec![
            case("a", 28, 2, 2023, next),
            case("b", 28, 2, 2023, next),
        ]);

        assert_eq!(build.index.key_count(), 1);
        let values = build.index.get(&DateKey::new(28, 2, 2023)).unwrap();
        assert_eq!(values.len(), 2);
        assert!(build.duplicates.is_empty());
    }

    #[test]
    fn test_duplicate_rows_last_write_wins() {
        let first = CalendarResult::Valid(DateKey::new(29, 2, 2023));
        let second = CalendarResult::Valid(DateKey::new(1, 3, 2023));
        let build = build_index(vec![
            case("a", 28, 2, 2023, first),
            case("a", 28, 2, 2023, second).with_row(9),
        ]);

        let values = build.index.get(&DateKey::new(28, 2, 2023)).unwrap();
        assert_eq!(values.get(&SourceTag::new("a")), Some(&Expected::Label(second)));
        assert_eq!(build.duplicates.len(), 1);
        assert_eq!(build.duplicates[0].replaced, Expected::Label(first));
        assert_eq!(build.duplicates[0].kept, Expected::Label(second));
        assert_eq!(build.duplicates[0].row, Some(9));
    }

    #[test]
    fn test_split_by_source_preserves_first_seen_order() {
        let build = build_index(vec![
            case("b", 1, 1, 2020, CalendarResult::Invalid),
            case("a", 2, 1, 2020, CalendarResult::Invalid),
            case("b", 3, 1, 2020, CalendarResult::Invalid),
        ]);

        let split = build.index.split_by_source();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].0, SourceTag::new("b"));
        assert_eq!(split[0].1.len(), 2);
        assert_eq!(split[1].0, SourceTag::new("a"));
        assert_eq!(split[1].1.len(), 1);
    }

    #[test]
    fn test_source_index() {
        let (index, dups) = source_index(vec![
            case("a", 1, 1, 2020, CalendarResult::Invalid),
            case("a", 1, 1, 2020, CalendarResult::Invalid),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(dups.len(), 1);
    }
}
