//! Source loading: tables, structured rows, and the hand-off to normalization.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::calendar::CalendarResult;
use crate::config::{ColumnRef, KeySpec, SourceSpec};
use crate::error::{NextDateError, Result};
use crate::record::{normalize_rows, NormalizedBatch, RawExpected, RawKey, RawRecord};

use super::parser::{Parser, ParserConfig};
use super::workbook;

/// Extensions read through the spreadsheet reader.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Metadata about a loaded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, xlsx, ...).
    pub format: String,
    /// Worksheet read, for spreadsheets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Number of data rows (excluding skipped rows and header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            sheet: None,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

/// `sha256:<hex>` digest of raw file bytes.
pub(crate) fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// One data row with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Parsed tabular data with leading rows and header already handled.
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column names; `#1`, `#2`, ... for headerless sources.
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl DataTable {
    /// Build a table from raw `(line, cells)` records.
    ///
    /// Drops `skip_rows` leading records, takes the next one as the header
    /// when `has_header`, and drops rows whose cells are all blank. Short rows
    /// are padded so every row has one cell per column.
    pub fn from_records(
        records: impl IntoIterator<Item = (usize, Vec<String>)>,
        skip_rows: usize,
        has_header: bool,
    ) -> Result<Self> {
        let mut records = records.into_iter().skip(skip_rows);

        let header_cells = if has_header {
            match records.next() {
                Some((_, cells)) => Some(cells),
                None => return Err(NextDateError::EmptyData("No header row found".to_string())),
            }
        } else {
            None
        };

        let rows: Vec<TableRow> = records
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(line, cells)| TableRow { line, cells })
            .collect();

        let width = header_cells
            .as_ref()
            .map(|h| h.len())
            .into_iter()
            .chain(rows.iter().map(|r| r.cells.len()))
            .max()
            .unwrap_or(0);

        if width == 0 {
            return Err(NextDateError::EmptyData("No columns found".to_string()));
        }

        let headers = match header_cells {
            Some(cells) => unique_headers(cells, width),
            None => (1..=width).map(|i| format!("#{}", i)).collect(),
        };

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.cells.resize(width, String::new());
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column, by header name (case-insensitive) or 1-based index.
    pub fn column_index(&self, column: &ColumnRef) -> Option<usize> {
        match column {
            ColumnRef::Index(i) if *i >= 1 && *i <= self.headers.len() => Some(i - 1),
            ColumnRef::Index(_) => None,
            ColumnRef::Name(name) => {
                let name = name.trim();
                self.headers
                    .iter()
                    .position(|h| h == name)
                    .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
            }
        }
    }

    /// Rows with cells addressed by column name.
    pub fn structured_rows(&self) -> Vec<StructuredRow> {
        self.rows
            .iter()
            .map(|row| StructuredRow {
                row: row.line,
                cells: self
                    .headers
                    .iter()
                    .cloned()
                    .zip(row.cells.iter().cloned())
                    .collect(),
            })
            .collect()
    }
}

/// Blank and repeated header cells become `#<position>`. A generated name
/// never shadows a real header, so every column keeps its own cell.
fn unique_headers(cells: Vec<String>, width: usize) -> Vec<String> {
    let cells: Vec<String> = cells
        .into_iter()
        .chain(std::iter::repeat(String::new()))
        .take(width)
        .map(|cell| cell.trim().to_string())
        .collect();
    let literal: HashSet<&str> = cells.iter().map(String::as_str).filter(|c| !c.is_empty()).collect();

    let mut headers: Vec<String> = Vec::with_capacity(width);
    for (i, cell) in cells.iter().enumerate() {
        if !cell.is_empty() && !headers.contains(cell) {
            headers.push(cell.clone());
            continue;
        }

        let mut name = format!("#{}", i + 1);
        let mut suffix = 2;
        while literal.contains(name.as_str()) || headers.contains(&name) {
            name = format!("#{}_{}", i + 1, suffix);
            suffix += 1;
        }
        headers.push(name);
    }
    headers
}

/// A data row whose cells are addressed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredRow {
    /// 1-based line in the source file.
    pub row: usize,
    pub cells: IndexMap<String, String>,
}

impl StructuredRow {
    pub fn get(&self, column: &ColumnRef) -> Option<&str> {
        match column {
            ColumnRef::Index(i) => i
                .checked_sub(1)
                .and_then(|i| self.cells.get_index(i))
                .map(|(_, v)| v.as_str()),
            ColumnRef::Name(name) => self.cells.get(name.trim()).map(|v| v.as_str()).or_else(|| {
                self.cells
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name.trim()))
                    .map(|(_, v)| v.as_str())
            }),
        }
    }
}

/// A source after loading and normalization.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub metadata: SourceMetadata,
    pub batch: NormalizedBatch,
}

/// Whether a path is read through the spreadsheet reader.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read a source file into a table, choosing the reader by extension.
pub fn read_table(spec: &SourceSpec) -> Result<(DataTable, SourceMetadata)> {
    if !spec.file.exists() {
        return Err(NextDateError::FileNotFound(spec.file.clone()));
    }

    if is_spreadsheet(&spec.file) {
        workbook::read_workbook(&spec.file, spec.sheet.as_deref(), spec.skip_rows, spec.has_header)
    } else {
        let parser = Parser::with_config(ParserConfig {
            delimiter: spec.delimiter_byte()?,
            has_header: spec.has_header,
            skip_rows: spec.skip_rows,
            ..ParserConfig::default()
        });
        parser.parse_file(&spec.file)
    }
}

/// Load one configured source: read, map columns, normalize.
pub fn load_source(spec: &SourceSpec) -> Result<LoadedSource> {
    let (table, metadata) = read_table(spec)?;

    for column in spec.columns() {
        if table.column_index(column).is_none() {
            return Err(NextDateError::Config(format!(
                "source '{}': {} not found in {}",
                spec.name, column, metadata.file
            )));
        }
    }

    let records = raw_records(&table.structured_rows(), spec);
    let batch = normalize_rows(records, &spec.tag(), spec.conventions());

    if !batch.diagnostics.is_empty() {
        warn!(
            source = %spec.name,
            skipped = batch.skipped(),
            unparsed = batch.unparsed(),
            "rows needed attention"
        );
    }
    info!(
        source = %spec.name,
        file = %metadata.file,
        rows = metadata.row_count,
        cases = batch.cases.len(),
        "loaded source"
    );

    Ok(LoadedSource { metadata, batch })
}

/// Map structured rows onto raw records using a source's column layout.
pub fn raw_records(rows: &[StructuredRow], spec: &SourceSpec) -> Vec<RawRecord> {
    rows.iter()
        .map(|row| {
            let cell = |column: &ColumnRef| row.get(column).unwrap_or("").to_string();

            let key = match &spec.key {
                KeySpec::Fields { day, month, year } => RawKey::fields(cell(day), cell(month), cell(year)),
                KeySpec::Composite { column, .. } => RawKey::composite(cell(column)),
            };

            let flagged_invalid = spec
                .expected
                .valid_column
                .as_ref()
                .map(|column| is_negative_flag(&cell(column)))
                .unwrap_or(false);

            let expected = if flagged_invalid {
                RawExpected::Label(CalendarResult::Invalid)
            } else {
                RawExpected::text(cell(&spec.expected.column))
            };

            RawRecord::new(key, expected).at_row(row.row)
        })
        .collect()
}

fn is_negative_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "no" | "n" | "false" | "0" | "invalid"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DateConvention, DateKey};
    use crate::record::Expected;

    fn records(rows: &[&[&str]]) -> Vec<(usize, Vec<String>)> {
        rows.iter()
            .enumerate()
            .map(|(i, cells)| (i + 1, cells.iter().map(|c| c.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_from_records_skips_title_rows() {
        let table = DataTable::from_records(
            records(&[
                &["Next Date BVA"],
                &[""],
                &["S.No", "Day", "Month", "Year", "Expected", "Valid"],
                &["1", "28", "2", "2024", "29/02/2024", "Yes"],
                &["", "", "", "", "", ""],
                &["2", "30", "2", "2023", "Invalid", "No"],
            ]),
            2,
            true,
        )
        .unwrap();

        assert_eq!(table.headers[1], "Day");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].line, 6);
        assert_eq!(table.column_index(&ColumnRef::from("year")), Some(3));
        assert_eq!(table.column_index(&ColumnRef::Index(6)), Some(5));
        assert_eq!(table.column_index(&ColumnRef::Index(7)), None);
    }

    #[test]
    fn test_headerless_names_and_padding() {
        let table = DataTable::from_records(
            records(&[&["2024-02-28", "2024-02-29"], &["2023-12-31"]]),
            0,
            false,
        )
        .unwrap();

        assert_eq!(table.headers, vec!["#1", "#2"]);
        let rows = table.structured_rows();
        assert_eq!(rows[1].get(&ColumnRef::Index(2)), Some(""));
        assert_eq!(rows[0].get(&ColumnRef::from("#1")), Some("2024-02-28"));
    }

    #[test]
    fn test_duplicate_headers_made_unique() {
        let table =
            DataTable::from_records(records(&[&["a", "a", ""], &["1", "2", "3"]]), 0, true).unwrap();
        assert_eq!(table.headers, vec!["a", "#2", "#3"]);
    }

    #[test]
    fn test_generated_header_never_shadows_literal() {
        let table = DataTable::from_records(
            records(&[&["", "#1", "x", "x"], &["a", "b", "c", "d"]]),
            0,
            true,
        )
        .unwrap();
        assert_eq!(table.headers, vec!["#1_2", "#1", "x", "#4"]);

        let rows = table.structured_rows();
        assert_eq!(rows[0].cells.len(), 4);
        assert_eq!(rows[0].get(&ColumnRef::Index(1)), Some("a"));
        assert_eq!(rows[0].get(&ColumnRef::Index(2)), Some("b"));
        assert_eq!(rows[0].get(&ColumnRef::Index(4)), Some("d"));
        assert_eq!(rows[0].get(&ColumnRef::Name("#1".into())), Some("b"));
    }

    #[test]
    fn test_empty_table_is_error() {
        assert!(DataTable::from_records(Vec::new(), 0, true).is_err());
    }

    #[test]
    fn test_raw_records_valid_flag_forces_invalid() {
        let table = DataTable::from_records(
            records(&[
                &["1", "28", "2", "2024", "29/02/2024", "Yes"],
                &["2", "30", "2", "2023", "01/03/2023", "No"],
            ]),
            0,
            false,
        )
        .unwrap();

        let spec = SourceSpec {
            name: "boundary-suite".into(),
            file: PathBuf::from("bva.xlsx"),
            sheet: None,
            skip_rows: 0,
            has_header: false,
            delimiter: None,
            key: KeySpec::Fields {
                day: 2.into(),
                month: 3.into(),
                year: 4.into(),
            },
            expected: crate::config::ExpectedSpec {
                column: 5.into(),
                convention: DateConvention::DayMonthYear,
                valid_column: Some(6.into()),
            },
        };

        let raws = raw_records(&table.structured_rows(), &spec);
        let batch = normalize_rows(raws, &spec.tag(), spec.conventions());

        assert_eq!(batch.cases.len(), 2);
        assert_eq!(
            batch.cases[0].expected,
            Expected::Label(CalendarResult::Valid(DateKey::new(29, 2, 2024)))
        );
        assert_eq!(batch.cases[1].expected, Expected::Label(CalendarResult::Invalid));
        assert_eq!(batch.cases[1].row, Some(2));
    }

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("BVA_Next_Date.xlsx")));
        assert!(is_spreadsheet(Path::new("suite.ODS")));
        assert!(!is_spreadsheet(Path::new("generated.csv")));
    }
}
