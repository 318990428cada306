//! Delimited text parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{NextDateError, Result};

use super::source::{content_hash, DataTable, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the first kept row is a header.
    pub has_header: bool,
    /// Leading rows to drop before the header.
    pub skip_rows: usize,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            skip_rows: 0,
            quote: b'"',
        }
    }
}

/// Parses delimited text files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| NextDateError::io(path, e))?;
        let size_bytes = file
            .metadata()
            .map_err(|e| NextDateError::io(path, e))?
            .len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| NextDateError::io(path, e))?;

        let hash = content_hash(&contents);

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let table = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);
            let cells = record.iter().map(|s| s.trim().to_string()).collect();
            records.push((line, cells));
        }

        if records.is_empty() {
            return Err(NextDateError::EmptyData("No data rows found".to_string()));
        }

        DataTable::from_records(records, self.config.skip_rows, self.config.has_header)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(NextDateError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        let max_count = counts.iter().copied().max().unwrap_or(0);
        if max_count == 0 {
            continue;
        }

        // Consistent counts beat frequent ones; tab wins ties since it rarely
        // shows up inside values.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + usize::from(delim == b'\t') * 100
        } else {
            max_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"input,expected\n2024-02-28,2024-02-29\n2023-02-29,INVALID";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"Day\tMonth\tYear\n28\t2\t2024\n31\t12\t1999";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_semicolon_with_title_line() {
        let data = b"Suite export\nDay;Month;Year;Expected\n28;2;2024;29/02/2024\n";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_parse_headered() {
        let parser = Parser::new();
        let data = b"Test Case ID,Day,Month,Year,Expected Output\nTC1,28,2,2024,29-02-2024\nTC2,31,4,2021,Invalid Date";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.headers[4], "Expected Output");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].cells[4], "Invalid Date");
    }

    #[test]
    fn test_parse_headerless_with_skip() {
        let parser = Parser::with_config(ParserConfig {
            has_header: false,
            skip_rows: 1,
            ..ParserConfig::default()
        });
        let data = b"generated\n2024-02-28,2024-02-29\n";
        let table = parser.parse_bytes(data, b',').unwrap();
        assert_eq!(table.headers, vec!["#1", "#2"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(Parser::new().parse_bytes(b"", b',').is_err());
    }
}
