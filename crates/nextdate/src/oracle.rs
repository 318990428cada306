//! The calendar engine used as a test oracle.
//!
//! Two uses: produce a `computed-output` source whose labels come straight
//! from [`next_date_for`], and grade another source's claims against it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::calendar::{next_date_for, CalendarResult, DateKey};
use crate::record::{Expected, SourceTag, TestCase};

/// One computed case per distinct key, in key order.
pub fn computed_source<'a>(keys: impl IntoIterator<Item = &'a DateKey>) -> Vec<TestCase> {
    let distinct: BTreeSet<DateKey> = keys.into_iter().copied().collect();
    distinct
        .into_iter()
        .map(|key| TestCase::new(key, next_date_for(&key), SourceTag::computed_output()))
        .collect()
}

/// How one case fared against the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail { actual: CalendarResult },
    /// The expected value was unparsed text, so there is nothing to judge.
    Unjudged,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "Pass",
            Verdict::Fail { .. } => "Fail",
            Verdict::Unjudged => "Unjudged",
        }
    }
}

/// A graded case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedCase {
    pub case: TestCase,
    pub actual: CalendarResult,
    pub verdict: Verdict,
}

/// Grading results for a sequence of cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    pub cases: Vec<GradedCase>,
    pub passed: usize,
    pub failed: usize,
    pub unjudged: usize,
}

impl GradeReport {
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &GradedCase> {
        self.cases
            .iter()
            .filter(|g| matches!(g.verdict, Verdict::Fail { .. }))
    }
}

/// Judge each case's expected label against the engine.
pub fn grade(cases: &[TestCase]) -> GradeReport {
    let mut report = GradeReport::default();

    for case in cases {
        let actual = next_date_for(&case.key);
        let verdict = match &case.expected {
            Expected::Label(label) if *label == actual => Verdict::Pass,
            Expected::Label(_) => Verdict::Fail { actual },
            Expected::Unparsed(_) => Verdict::Unjudged,
        };
        match verdict {
            Verdict::Pass => report.passed += 1,
            Verdict::Fail { .. } => report.failed += 1,
            Verdict::Unjudged => report.unjudged += 1,
        }
        report.cases.push(GradedCase {
            case: case.clone(),
            actual,
            verdict,
        });
    }

    report
}
