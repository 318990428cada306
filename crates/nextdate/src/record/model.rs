//! Shared value types: source tags, expected values, test cases, diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarResult, DateKey};

/// Names where a test case came from.
///
/// Tags carry provenance only; reconciliation never treats one source as
/// more authoritative than another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceTag(String);

impl SourceTag {
    /// Hand-written boundary-value suite.
    pub const BOUNDARY_SUITE: &'static str = "boundary-suite";
    /// Broad hand-written suite.
    pub const COMPREHENSIVE_SUITE: &'static str = "comprehensive-suite";
    /// Cases returned by a generation service.
    pub const GENERATED_SUITE: &'static str = "generated-suite";
    /// Labels computed by the calendar engine.
    pub const COMPUTED_OUTPUT: &'static str = "computed-output";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn boundary_suite() -> Self {
        Self::new(Self::BOUNDARY_SUITE)
    }

    pub fn comprehensive_suite() -> Self {
        Self::new(Self::COMPREHENSIVE_SUITE)
    }

    pub fn generated_suite() -> Self {
        Self::new(Self::GENERATED_SUITE)
    }

    pub fn computed_output() -> Self {
        Self::new(Self::COMPUTED_OUTPUT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Status label for keys only this source holds, e.g. `ONLY_IN_BOUNDARY_SUITE`.
    pub fn only_in_status(&self) -> String {
        let name: String = self
            .0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("ONLY_IN_{}", name)
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// What a source claims the successor of a key is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// A normalized label: a successor date or `Invalid`.
    Label(CalendarResult),
    /// Free text that is neither a date nor a known invalid token.
    Unparsed(String),
}

impl Expected {
    pub fn is_unparsed(&self) -> bool {
        matches!(self, Expected::Unparsed(_))
    }

    pub fn label(&self) -> Option<&CalendarResult> {
        match self {
            Expected::Label(label) => Some(label),
            Expected::Unparsed(_) => None,
        }
    }
}

impl From<CalendarResult> for Expected {
    fn from(label: CalendarResult) -> Self {
        Expected::Label(label)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Label(label) => write!(f, "{}", label),
            Expected::Unparsed(text) => f.write_str(text),
        }
    }
}

/// One labeled input date from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub key: DateKey,
    pub expected: Expected,
    pub source: SourceTag,
    /// 1-based row in the originating file, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl TestCase {
    pub fn new(key: DateKey, expected: impl Into<Expected>, source: SourceTag) -> Self {
        Self {
            key,
            expected: expected.into(),
            source,
            row: None,
        }
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// Whether a diagnostic dropped the row or only flagged a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The row could not become a test case and was skipped.
    SkippedRow,
    /// The row was kept but its expected value stayed unparsed.
    UnparsedValue,
}

/// A row-level problem, recorded instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub kind: DiagnosticKind,
    pub source: SourceTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Which field was at fault (`key`, `day`, `expected`, ...).
    pub field: String,
    /// The offending text.
    pub value: String,
    pub reason: String,
}

impl ParseDiagnostic {
    pub fn skipped(
        source: &SourceTag,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticKind::SkippedRow,
            source: source.clone(),
            row: None,
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn unparsed(source: &SourceTag, value: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::UnparsedValue,
            source: source.clone(),
            row: None,
            field: "expected".to_string(),
            value: value.into(),
            reason: "not a date or a recognized invalid token; kept verbatim".to_string(),
        }
    }

    pub fn at_row(mut self, row: Option<usize>) -> Self {
        self.row = row;
        self
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.kind {
            DiagnosticKind::SkippedRow => "skipped",
            DiagnosticKind::UnparsedValue => "unparsed",
        };
        match self.row {
            Some(row) => write!(
                f,
                "[{}] row {} {}: {} '{}' ({})",
                self.source, row, action, self.field, self.value, self.reason
            ),
            None => write!(
                f,
                "[{}] {}: {} '{}' ({})",
                self.source, action, self.field, self.value, self.reason
            ),
        }
    }
}
