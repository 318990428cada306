//! Spreadsheet reader (xlsx, xls, xlsb, ods).

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Days, NaiveDate};

use crate::error::{NextDateError, Result};

use super::source::{content_hash, DataTable, SourceMetadata};

/// Read one worksheet (the first unless `sheet` names another).
pub fn read_workbook(
    path: &Path,
    sheet: Option<&str>,
    skip_rows: usize,
    has_header: bool,
) -> Result<(DataTable, SourceMetadata)> {
    let bytes = fs::read(path).map_err(|e| NextDateError::io(path, e))?;
    let hash = content_hash(&bytes);

    let spreadsheet_err = |message: String| NextDateError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| spreadsheet_err(format!("failed to open: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                spreadsheet_err(format!(
                    "sheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                ))
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| spreadsheet_err("workbook contains no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_err(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    // Data may not begin at A1; line numbers stay sheet-relative.
    let (start_row, _) = range.start().unwrap_or((0, 0));
    let records: Vec<(usize, Vec<String>)> = range
        .rows()
        .enumerate()
        .map(|(i, row)| {
            (
                start_row as usize + i + 1,
                row.iter().map(render_cell).collect(),
            )
        })
        .collect();

    if records.is_empty() {
        return Err(NextDateError::EmptyData(format!(
            "sheet '{}' has no rows",
            sheet_name
        )));
    }

    let table = DataTable::from_records(records, skip_rows, has_header)?;

    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "spreadsheet".to_string());

    let metadata = SourceMetadata::new(
        path.to_path_buf(),
        hash,
        bytes.len() as u64,
        format,
        table.row_count(),
        table.column_count(),
    )
    .with_sheet(sheet_name);

    Ok((table, metadata))
}

/// Render a cell as text. Whole floats lose their `.0`; date cells become `YYYY-MM-DD`.
pub(crate) fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.get(..10).unwrap_or(s.as_str()).to_string(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Convert a 1900-system serial to a calendar date.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // The 1899-12-30 epoch absorbs the phantom 1900-02-29.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(&Data::Float(29.0)), "29");
        assert_eq!(render_cell(&Data::Float(2.5)), "2.5");
        assert_eq!(render_cell(&Data::Int(2024)), "2024");
        assert_eq!(render_cell(&Data::String(" 29/02/2024 ".into())), "29/02/2024");
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(
            render_cell(&Data::DateTimeIso("2024-02-29T00:00:00".into())),
            "2024-02-29"
        );
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(serial_to_date(45351.0), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(serial_to_date(61.0), NaiveDate::from_ymd_opt(1900, 3, 1));
        assert_eq!(serial_to_date(0.0), None);
    }

    /// A two-sheet BVA-style workbook: a cover sheet, then a titled table
    /// whose expected column holds real date cells.
    fn write_bva_workbook(path: &Path) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
        use rust_xlsxwriter::{Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        workbook
            .add_worksheet()
            .set_name("Cover")?
            .write_string(0, 0, "Next Date boundary cases")?;

        let sheet = workbook.add_worksheet().set_name("Cases")?;
        sheet.write_string(0, 0, "Next Date BVA")?;
        for (col, name) in ["Day", "Month", "Year", "Expected", "Valid?"].iter().enumerate() {
            sheet.write_string(1, col as u16, *name)?;
        }
        sheet.write_number(2, 0, 28.0)?;
        sheet.write_number(2, 1, 2.0)?;
        sheet.write_number(2, 2, 2024.0)?;
        sheet.write_number_with_format(2, 3, 45351.0, &date_format)?;
        sheet.write_string(2, 4, "Yes")?;
        sheet.write_number(3, 0, 31.0)?;
        sheet.write_number(3, 1, 4.0)?;
        sheet.write_number(3, 2, 2021.0)?;
        sheet.write_string(3, 3, "Invalid")?;
        sheet.write_string(3, 4, "No")?;

        workbook.save(path)?;
        Ok(())
    }

    #[test]
    fn test_read_named_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bva.xlsx");
        write_bva_workbook(&path).unwrap();

        let (table, metadata) = read_workbook(&path, Some("Cases"), 1, true).unwrap();

        assert_eq!(table.headers, vec!["Day", "Month", "Year", "Expected", "Valid?"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].cells, vec!["28", "2", "2024", "2024-02-29", "Yes"]);
        assert_eq!(table.rows[0].line, 3);
        assert_eq!(table.rows[1].cells[3], "Invalid");
        assert_eq!(metadata.format, "xlsx");
        assert_eq!(metadata.sheet.as_deref(), Some("Cases"));
        assert!(metadata.hash.starts_with("sha256:"));
    }

    #[test]
    fn test_first_sheet_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bva.xlsx");
        write_bva_workbook(&path).unwrap();

        let (table, metadata) = read_workbook(&path, None, 0, false).unwrap();

        assert_eq!(metadata.sheet.as_deref(), Some("Cover"));
        assert_eq!(table.rows[0].cells, vec!["Next Date boundary cases"]);
    }

    #[test]
    fn test_unknown_sheet_lists_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bva.xlsx");
        write_bva_workbook(&path).unwrap();

        let err = read_workbook(&path, Some("Summary"), 0, true).unwrap_err();
        match err {
            NextDateError::Spreadsheet { message, .. } => {
                assert!(message.contains("'Summary' not found"));
                assert!(message.contains("Cover, Cases"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_workbook() {
        let err = read_workbook(Path::new("/nonexistent/suite.xlsx"), None, 0, true).unwrap_err();
        assert!(matches!(err, NextDateError::FileNotFound(_)));
    }
}
