//! Boundary-value coverage of a test suite.
//!
//! Tags each key with the calendar edges it exercises (February ends,
//! month ends, year ends, century years) so a suite can be checked for the
//! cases that matter most to a next-date implementation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::date::DateKey;
use super::engine::{days_in_month, is_leap_year, is_valid};

/// A calendar edge a key sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Feb 28 or Feb 29 in a leap year.
    LeapFebruaryEnd,
    /// Feb 28 or Feb 29 in a common year (Feb 29 being invalid there).
    CommonFebruaryEnd,
    /// Last valid day of its month.
    MonthEnd,
    /// December 31.
    YearEnd,
    /// A year divisible by 100, where the leap rule has its exceptions.
    CenturyYear,
    /// Not a real date.
    InvalidDate,
}

impl BoundaryKind {
    pub fn label(&self) -> &'static str {
        match self {
            BoundaryKind::LeapFebruaryEnd => "Leap-year February end",
            BoundaryKind::CommonFebruaryEnd => "Common-year February end",
            BoundaryKind::MonthEnd => "Month end",
            BoundaryKind::YearEnd => "Year end (Dec 31)",
            BoundaryKind::CenturyYear => "Century year",
            BoundaryKind::InvalidDate => "Invalid date",
        }
    }
}

/// All boundary kinds a key exercises, in declaration order.
pub fn classify_boundary(key: &DateKey) -> Vec<BoundaryKind> {
    let (day, month, year) = (key.day(), key.month(), key.year());
    let mut kinds = Vec::new();

    if month == 2 && (day == 28 || day == 29) {
        if is_leap_year(year) {
            kinds.push(BoundaryKind::LeapFebruaryEnd);
        } else {
            kinds.push(BoundaryKind::CommonFebruaryEnd);
        }
    }

    if days_in_month(month, year) == Some(day) {
        kinds.push(BoundaryKind::MonthEnd);
        if month == 12 {
            kinds.push(BoundaryKind::YearEnd);
        }
    }

    if year.rem_euclid(100) == 0 {
        kinds.push(BoundaryKind::CenturyYear);
    }

    if !is_valid(day, month, year) {
        kinds.push(BoundaryKind::InvalidDate);
    }

    kinds
}

/// Aggregate boundary coverage for a set of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryCoverage {
    /// Number of keys examined.
    pub total: usize,
    /// Keys per boundary kind (a key may count toward several kinds).
    pub by_kind: BTreeMap<BoundaryKind, usize>,
    /// Leap years appearing in the suite.
    pub leap_years: BTreeSet<i64>,
    /// Common years appearing in the suite.
    pub common_years: BTreeSet<i64>,
    /// Year rollovers (`from`, `to`) exercised by Dec 31 cases.
    pub year_transitions: BTreeSet<(i64, i64)>,
    /// Month-end cases keyed by month number.
    pub month_ends: BTreeMap<i64, usize>,
}

impl BoundaryCoverage {
    /// Count for one kind (zero when absent).
    pub fn count(&self, kind: BoundaryKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Boundary kinds the suite never touches.
    pub fn missing_kinds(&self) -> Vec<BoundaryKind> {
        [
            BoundaryKind::LeapFebruaryEnd,
            BoundaryKind::CommonFebruaryEnd,
            BoundaryKind::MonthEnd,
            BoundaryKind::YearEnd,
            BoundaryKind::CenturyYear,
            BoundaryKind::InvalidDate,
        ]
        .into_iter()
        .filter(|kind| self.count(*kind) == 0)
        .collect()
    }
}

/// Compute boundary coverage over a sequence of keys.
pub fn coverage<'a>(keys: impl IntoIterator<Item = &'a DateKey>) -> BoundaryCoverage {
    let mut result = BoundaryCoverage::default();

    for key in keys {
        result.total += 1;

        if (1..=12).contains(&key.month()) {
            if is_leap_year(key.year()) {
                result.leap_years.insert(key.year());
            } else {
                result.common_years.insert(key.year());
            }
        }

        for kind in classify_boundary(key) {
            *result.by_kind.entry(kind).or_insert(0) += 1;
            match kind {
                BoundaryKind::MonthEnd => {
                    *result.month_ends.entry(key.month()).or_insert(0) += 1;
                }
                BoundaryKind::YearEnd => {
                    if let Some(next) = key.year().checked_add(1) {
                        result.year_transitions.insert((key.year(), next));
                    }
                }
                _ => {}
            }
        }
    }

    result
}
