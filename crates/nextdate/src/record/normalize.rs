//! Normalization of raw rows into keyed test cases.
//!
//! This is the one boundary where textual dates become [`DateKey`]s. Sources
//! spell dates differently (field triples, `YYYY-MM-DD`, `DD/MM/YYYY`), and
//! each source's convention is configured, never guessed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{CalendarResult, DateConvention, DateKey};

use super::model::{Expected, ParseDiagnostic, SourceTag, TestCase};

/// Tokens that mean "this input has no successor".
const INVALID_TOKENS: &[&str] = &[
    "invalid",
    "invalid date",
    "invalido",
    "inválido",
    "no valido",
    "no válido",
    "ungultig",
    "ungültig",
    "non valide",
    "non valido",
];

/// The key side of a raw row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKey {
    /// Separate day, month and year cells.
    Fields {
        day: String,
        month: String,
        year: String,
    },
    /// A single date string in the source's key convention.
    Composite(String),
}

impl RawKey {
    pub fn fields(day: impl Into<String>, month: impl Into<String>, year: impl Into<String>) -> Self {
        RawKey::Fields {
            day: day.into(),
            month: month.into(),
            year: year.into(),
        }
    }

    pub fn composite(text: impl Into<String>) -> Self {
        RawKey::Composite(text.into())
    }
}

/// The expected-output side of a raw row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawExpected {
    /// Free text from a cell or a generated line.
    Text(String),
    /// An already-normalized label; passes through unchanged.
    Label(CalendarResult),
    /// The cell was empty or absent.
    Missing,
}

impl RawExpected {
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            RawExpected::Missing
        } else {
            RawExpected::Text(text)
        }
    }
}

/// Date conventions a source uses for its key and expected columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conventions {
    pub key: DateConvention,
    pub expected: DateConvention,
}

impl Conventions {
    pub fn new(key: DateConvention, expected: DateConvention) -> Self {
        Self { key, expected }
    }

    /// Same convention on both sides.
    pub fn uniform(convention: DateConvention) -> Self {
        Self::new(convention, convention)
    }
}

/// A raw row awaiting normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub row: Option<usize>,
    pub key: RawKey,
    pub expected: RawExpected,
}

impl RawRecord {
    pub fn new(key: RawKey, expected: RawExpected) -> Self {
        Self {
            row: None,
            key,
            expected,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// Successes and diagnostics from one source's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBatch {
    pub source: SourceTag,
    pub cases: Vec<TestCase>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl NormalizedBatch {
    pub fn new(source: SourceTag) -> Self {
        Self {
            source,
            cases: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Number of rows that were dropped.
    pub fn skipped(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == super::model::DiagnosticKind::SkippedRow)
            .count()
    }

    /// Number of kept cases whose expected value stayed unparsed.
    pub fn unparsed(&self) -> usize {
        self.cases.iter().filter(|c| c.expected.is_unparsed()).count()
    }
}

/// Normalize one raw row.
///
/// Malformed keys and missing expected values are errors (the caller skips
/// the row). An expected value that is neither a date nor an invalid token is
/// not an error: it is kept as [`Expected::Unparsed`].
pub fn normalize(
    raw_key: RawKey,
    raw_expected: RawExpected,
    source: &SourceTag,
    conventions: Conventions,
) -> Result<TestCase, ParseDiagnostic> {
    let key = normalize_key(&raw_key, source, conventions.key)?;
    let expected = normalize_expected(&raw_expected, source, conventions.expected)?;
    Ok(TestCase::new(key, expected, source.clone()))
}

/// Normalize a sequence of rows, keeping every failure as a diagnostic.
pub fn normalize_rows(
    records: impl IntoIterator<Item = RawRecord>,
    source: &SourceTag,
    conventions: Conventions,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::new(source.clone());

    for record in records {
        match normalize(record.key, record.expected, source, conventions) {
            Ok(mut case) => {
                case.row = record.row;
                if let Expected::Unparsed(ref text) = case.expected {
                    batch
                        .diagnostics
                        .push(ParseDiagnostic::unparsed(source, text.clone()).at_row(record.row));
                }
                batch.cases.push(case);
            }
            Err(diag) => batch.diagnostics.push(diag.at_row(record.row)),
        }
    }

    debug!(
        source = %source,
        cases = batch.cases.len(),
        skipped = batch.skipped(),
        unparsed = batch.unparsed(),
        "normalized batch"
    );

    batch
}

fn normalize_key(
    raw: &RawKey,
    source: &SourceTag,
    convention: DateConvention,
) -> Result<DateKey, ParseDiagnostic> {
    match raw {
        RawKey::Composite(text) => DateKey::parse(text, convention).ok_or_else(|| {
            ParseDiagnostic::skipped(
                source,
                "key",
                text.clone(),
                format!("not a {} date", convention.label()),
            )
        }),
        RawKey::Fields { day, month, year } => {
            let day = parse_int_cell(day)
                .ok_or_else(|| ParseDiagnostic::skipped(source, "day", day.clone(), "not an integer"))?;
            let month = parse_int_cell(month).ok_or_else(|| {
                ParseDiagnostic::skipped(source, "month", month.clone(), "not an integer")
            })?;
            let year = parse_int_cell(year)
                .ok_or_else(|| ParseDiagnostic::skipped(source, "year", year.clone(), "not an integer"))?;
            Ok(DateKey::new(day, month, year))
        }
    }
}

fn normalize_expected(
    raw: &RawExpected,
    source: &SourceTag,
    convention: DateConvention,
) -> Result<Expected, ParseDiagnostic> {
    match raw {
        RawExpected::Label(label) => Ok(Expected::Label(*label)),
        RawExpected::Missing => Err(ParseDiagnostic::skipped(
            source,
            "expected",
            "",
            "missing expected value",
        )),
        RawExpected::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ParseDiagnostic::skipped(
                    source,
                    "expected",
                    text.clone(),
                    "missing expected value",
                ));
            }
            if is_invalid_token(trimmed) {
                return Ok(Expected::Label(CalendarResult::Invalid));
            }
            match DateKey::parse(trimmed, convention) {
                Some(next) => Ok(Expected::Label(CalendarResult::Valid(next))),
                None => Ok(Expected::Unparsed(text.clone())),
            }
        }
    }
}

/// Whether `text` is `INVALID` or a recognized localized equivalent.
pub fn is_invalid_token(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    INVALID_TOKENS.contains(&lowered.as_str())
}

/// Parse an integer cell, accepting spreadsheet floats with no fraction (`"29.0"`).
pub fn parse_int_cell(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    let f: f64 = text.parse().ok()?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
