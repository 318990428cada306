//! Summary counts and overlap accuracy.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::SourceTag;

use super::outcome::{Reconciliation, ReconciliationOutcome};

/// Agreement rate among keys held by two or more sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum OverlapAccuracy {
    /// Percentage in `0.0..=100.0`.
    Defined(f64),
    /// No key was shared, so there is nothing to measure.
    NoOverlap,
}

impl OverlapAccuracy {
    pub fn percent(&self) -> Option<f64> {
        match self {
            OverlapAccuracy::Defined(p) => Some(*p),
            OverlapAccuracy::NoOverlap => None,
        }
    }
}

impl From<Option<f64>> for OverlapAccuracy {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(p) => OverlapAccuracy::Defined(p),
            None => OverlapAccuracy::NoOverlap,
        }
    }
}

impl From<OverlapAccuracy> for Option<f64> {
    fn from(value: OverlapAccuracy) -> Self {
        value.percent()
    }
}

impl fmt::Display for OverlapAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapAccuracy::Defined(p) => write!(f, "{:.1}%", p),
            OverlapAccuracy::NoOverlap => f.write_str("no overlap"),
        }
    }
}

/// Counts over a reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub matches: usize,
    pub mismatches: usize,
    /// Source-exclusive key counts; every participating source is listed.
    pub only_in: IndexMap<SourceTag, usize>,
    pub total_keys: usize,
    /// `matches + mismatches`.
    pub overlap: usize,
    pub overlap_accuracy: OverlapAccuracy,
}

pub fn summarize(reconciliation: &Reconciliation) -> Summary {
    let mut only_in: IndexMap<SourceTag, usize> = reconciliation
        .sources()
        .iter()
        .map(|source| (source.clone(), 0))
        .collect();
    let mut matches = 0;
    let mut mismatches = 0;

    for outcome in reconciliation.outcomes() {
        match outcome {
            ReconciliationOutcome::Match { .. } => matches += 1,
            ReconciliationOutcome::Mismatch { .. } => mismatches += 1,
            ReconciliationOutcome::OnlyIn { source, .. } => {
                *only_in.entry(source.clone()).or_insert(0) += 1;
            }
        }
    }

    let overlap = matches + mismatches;
    let overlap_accuracy = if overlap > 0 {
        OverlapAccuracy::Defined(matches as f64 / overlap as f64 * 100.0)
    } else {
        OverlapAccuracy::NoOverlap
    };

    Summary {
        matches,
        mismatches,
        only_in,
        total_keys: reconciliation.key_count(),
        overlap,
        overlap_accuracy,
    }
}
