//! CSV artifacts: comparison tables, generated pairs, grading results.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{NextDateError, Result};
use crate::oracle::GradeReport;
use crate::reconcile::Reconciliation;

/// Write one row per reconciled key.
///
/// Header is `input,<source> output,...,status`. A source that lacks the key
/// gets an empty cell.
pub fn write_comparison<W: Write>(writer: W, reconciliation: &Reconciliation) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["input".to_string()];
    header.extend(
        reconciliation
            .sources()
            .iter()
            .map(|source| format!("{} output", source)),
    );
    header.push("status".to_string());
    csv.write_record(&header)?;

    for outcome in reconciliation.outcomes() {
        let mut record = vec![outcome.key().to_string()];
        record.extend(reconciliation.sources().iter().map(|source| {
            outcome
                .value_for(source)
                .map(|value| value.to_string())
                .unwrap_or_default()
        }));
        record.push(outcome.status());
        csv.write_record(&record)?;
    }

    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the comparison table to a file, creating parent directories.
pub fn write_comparison_file(path: impl AsRef<Path>, reconciliation: &Reconciliation) -> Result<()> {
    let file = create(path.as_ref())?;
    write_comparison(file, reconciliation)
}

/// Write generated `(input, expected)` pairs, headerless.
pub fn write_cases<W: Write>(writer: W, pairs: &[(String, String)]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for (input, expected) in pairs {
        csv.write_record([input.as_str(), expected.as_str()])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_cases_file(path: impl AsRef<Path>, pairs: &[(String, String)]) -> Result<()> {
    let file = create(path.as_ref())?;
    write_cases(file, pairs)
}

/// Write grading results as `input,expected,actual,result`.
pub fn write_graded<W: Write>(writer: W, report: &GradeReport) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["input", "expected", "actual", "result"])?;
    for graded in &report.cases {
        csv.write_record([
            graded.case.key.to_string(),
            graded.case.expected.to_string(),
            graded.actual.to_string(),
            graded.verdict.label().to_string(),
        ])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_graded_file(path: impl AsRef<Path>, report: &GradeReport) -> Result<()> {
    let file = create(path.as_ref())?;
    write_graded(file, report)
}

fn create(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| NextDateError::io(parent, e))?;
        }
    }
    fs::File::create(path).map_err(|e| NextDateError::io(path, e))
}
