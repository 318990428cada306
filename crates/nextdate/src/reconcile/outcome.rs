//! Classification results for one key and for a whole run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::calendar::DateKey;
use crate::record::{Expected, SourceTag};

/// How the sources holding one key relate to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// Two or more sources hold the key and all agree.
    Match {
        key: DateKey,
        sources: Vec<SourceTag>,
        value: Expected,
    },
    /// Two or more sources hold the key and at least two disagree.
    Mismatch {
        key: DateKey,
        values: IndexMap<SourceTag, Expected>,
    },
    /// Exactly one source holds the key.
    OnlyIn {
        key: DateKey,
        source: SourceTag,
        value: Expected,
    },
}

impl ReconciliationOutcome {
    pub fn key(&self) -> &DateKey {
        match self {
            ReconciliationOutcome::Match { key, .. }
            | ReconciliationOutcome::Mismatch { key, .. }
            | ReconciliationOutcome::OnlyIn { key, .. } => key,
        }
    }

    /// `MATCH`, `MISMATCH` or `ONLY_IN_<SOURCE>`.
    pub fn status(&self) -> String {
        match self {
            ReconciliationOutcome::Match { .. } => "MATCH".to_string(),
            ReconciliationOutcome::Mismatch { .. } => "MISMATCH".to_string(),
            ReconciliationOutcome::OnlyIn { source, .. } => source.only_in_status(),
        }
    }

    /// The value a given source holds for this key, if any.
    pub fn value_for(&self, source: &SourceTag) -> Option<&Expected> {
        match self {
            ReconciliationOutcome::Match { sources, value, .. } => {
                sources.contains(source).then_some(value)
            }
            ReconciliationOutcome::Mismatch { values, .. } => values.get(source),
            ReconciliationOutcome::OnlyIn {
                source: only,
                value,
                ..
            } => (only == source).then_some(value),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ReconciliationOutcome::Match { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, ReconciliationOutcome::Mismatch { .. })
    }
}

/// Every key in the union of sources, classified, in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub(crate) sources: Vec<SourceTag>,
    pub(crate) outcomes: Vec<ReconciliationOutcome>,
}

impl Reconciliation {
    /// Participating sources, sorted by tag.
    pub fn sources(&self) -> &[SourceTag] {
        &self.sources
    }

    pub fn outcomes(&self) -> &[ReconciliationOutcome] {
        &self.outcomes
    }

    pub fn key_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn matches(&self) -> impl Iterator<Item = &ReconciliationOutcome> {
        self.outcomes.iter().filter(|o| o.is_match())
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ReconciliationOutcome> {
        self.outcomes.iter().filter(|o| o.is_mismatch())
    }

    /// Keys held by `source` alone.
    pub fn only_in<'a>(
        &'a self,
        source: &'a SourceTag,
    ) -> impl Iterator<Item = &'a ReconciliationOutcome> + 'a {
        self.outcomes.iter().filter(move |o| {
            matches!(o, ReconciliationOutcome::OnlyIn { source: only, .. } if only == source)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarResult;

    #[test]
    fn test_value_for() {
        let key = DateKey::new(31, 12, 1999);
        let value = Expected::Label(CalendarResult::Valid(DateKey::new(1, 1, 2000)));
        let a = SourceTag::new("a");
        let b = SourceTag::new("b");

        let matched = ReconciliationOutcome::Match {
            key,
            sources: vec![a.clone(), b.clone()],
            value: value.clone(),
        };
        assert_eq!(matched.value_for(&b), Some(&value));
        assert_eq!(matched.value_for(&SourceTag::new("c")), None);
        assert_eq!(matched.status(), "MATCH");

        let only = ReconciliationOutcome::OnlyIn {
            key,
            source: a.clone(),
            value,
        };
        assert!(only.value_for(&a).is_some());
        assert!(only.value_for(&b).is_none());
        assert_eq!(only.status(), "ONLY_IN_A");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ReconciliationOutcome::OnlyIn {
            key: DateKey::new(1, 1, 2000),
            source: SourceTag::boundary_suite(),
            value: Expected::Label(CalendarResult::Invalid),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "only_in");
        assert_eq!(json["source"], "boundary-suite");
    }
}
