//! Suite configuration: which files to load and how to read them.
//!
//! ```toml
//! name = "next-date suites"
//!
//! [oracle]
//! enabled = true
//!
//! [[sources]]
//! name = "boundary-suite"
//! file = "BVA_Next_Date.xlsx"
//! skip_rows = 3
//! has_header = false
//! key = { day = 2, month = 3, year = 4 }
//! expected = { column = 5, convention = "dmy", valid_column = 6 }
//!
//! [[sources]]
//! name = "generated-suite"
//! file = "generated_testcases.csv"
//! has_header = false
//! key = { column = 1 }
//! expected = { column = 2 }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::DateConvention;
use crate::error::{NextDateError, Result};
use crate::record::{Conventions, SourceTag};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

fn default_name() -> String {
    "suite".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Add a `computed-output` source labeled by the calendar engine.
    #[serde(default)]
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// How to load one tabular source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub file: PathBuf,
    /// Worksheet name for spreadsheet files; first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Leading rows dropped before the header (or before data when headerless).
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default = "default_has_header")]
    pub has_header: bool,
    /// Single-character delimiter for text files; detected when absent.
    #[serde(default)]
    pub delimiter: Option<String>,
    pub key: KeySpec,
    pub expected: ExpectedSpec,
}

fn default_has_header() -> bool {
    true
}

impl SourceSpec {
    /// A headered delimited file with a composite key column and an expected column.
    pub fn delimited(
        name: impl Into<String>,
        file: impl Into<PathBuf>,
        key: impl Into<ColumnRef>,
        expected: impl Into<ColumnRef>,
        convention: DateConvention,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            sheet: None,
            skip_rows: 0,
            has_header: true,
            delimiter: None,
            key: KeySpec::Composite {
                column: key.into(),
                convention,
            },
            expected: ExpectedSpec {
                column: expected.into(),
                convention,
                valid_column: None,
            },
        }
    }

    pub fn tag(&self) -> SourceTag {
        SourceTag::new(self.name.as_str())
    }

    pub fn conventions(&self) -> Conventions {
        let key = match &self.key {
            KeySpec::Composite { convention, .. } => *convention,
            // Field triples carry no ordering ambiguity.
            KeySpec::Fields { .. } => self.expected.convention,
        };
        Conventions::new(key, self.expected.convention)
    }

    /// Parsed delimiter byte, if one is configured.
    pub fn delimiter_byte(&self) -> Result<Option<u8>> {
        match self.delimiter.as_deref() {
            None => Ok(None),
            Some("\\t") | Some("\t") => Ok(Some(b'\t')),
            Some(d) if d.len() == 1 => Ok(Some(d.as_bytes()[0])),
            Some(d) => Err(NextDateError::Config(format!(
                "source '{}': delimiter must be a single ASCII character, got '{}'",
                self.name, d
            ))),
        }
    }
}

/// Where the input date lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    /// Separate day, month and year columns.
    Fields {
        day: ColumnRef,
        month: ColumnRef,
        year: ColumnRef,
    },
    /// One column holding a whole date.
    Composite {
        column: ColumnRef,
        #[serde(default)]
        convention: DateConvention,
    },
}

/// Where the expected output lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSpec {
    pub column: ColumnRef,
    #[serde(default)]
    pub convention: DateConvention,
    /// Optional yes/no column; `no` forces the expected value to `Invalid`.
    #[serde(default)]
    pub valid_column: Option<ColumnRef>,
}

/// A column by header name or by 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "column {}", i),
            ColumnRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SuiteConfig {
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: SuiteConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file. Relative source paths are
    /// resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| NextDateError::io(path, e))?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for source in &mut self.sources {
            if source.file.is_relative() {
                source.file = base.join(&source.file);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(NextDateError::Config(
                "at least one [[sources]] entry is required".into(),
            ));
        }

        // Keyed by report status so `suite-a` and `suite_a` count as one name.
        let mut seen: HashMap<String, &str> = HashMap::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(NextDateError::Config("source name must not be empty".into()));
            }
            if self.oracle.enabled && source.name == SourceTag::COMPUTED_OUTPUT {
                return Err(NextDateError::Config(format!(
                    "source name '{}' is reserved for the calendar engine",
                    source.name
                )));
            }
            if let Some(previous) = seen.insert(source.tag().only_in_status(), source.name.as_str()) {
                return Err(if previous == source.name {
                    NextDateError::Config(format!("duplicate source name '{}'", source.name))
                } else {
                    NextDateError::Config(format!(
                        "source names '{}' and '{}' are indistinguishable in reports",
                        previous, source.name
                    ))
                });
            }
            if source.file.as_os_str().is_empty() {
                return Err(NextDateError::Config(format!(
                    "source '{}': file must not be empty",
                    source.name
                )));
            }
            source.delimiter_byte()?;

            for column in source.columns() {
                if let ColumnRef::Index(0) = column {
                    return Err(NextDateError::Config(format!(
                        "source '{}': column positions are 1-based",
                        source.name
                    )));
                }
                if let ColumnRef::Name(_) = column {
                    if !source.has_header {
                        return Err(NextDateError::Config(format!(
                            "source '{}': {} needs a header row; use a column position",
                            source.name, column
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl SourceSpec {
    /// Every column this source reads.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut columns = match &self.key {
            KeySpec::Fields { day, month, year } => vec![day, month, year],
            KeySpec::Composite { column, .. } => vec![column],
        };
        columns.push(&self.expected.column);
        if let Some(valid) = &self.expected.valid_column {
            columns.push(valid);
        }
        columns
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SUITES: &str = r#"
name = "next-date suites"

[oracle]
enabled = true

[[sources]]
name = "boundary-suite"
file = "BVA_Next_Date.xlsx"
skip_rows = 3
has_header = false
key = { day = 2, month = 3, year = 4 }
expected = { column = 5, convention = "dmy", valid_column = 6 }

[[sources]]
name = "comprehensive-suite"
file = "comprehensive.csv"
key = { day = "Day", month = "Month", year = "Year" }
expected = { column = "Expected Output", convention = "day-month-year" }

[[sources]]
name = "generated-suite"
file = "generated.csv"
has_header = false
delimiter = ","
key = { column = 1 }
expected = { column = 2 }
"#;

    #[test]
    fn parse_suites() {
        let config = SuiteConfig::from_toml(SUITES).unwrap();
        assert_eq!(config.name, "next-date suites");
        assert!(config.oracle.enabled);
        assert_eq!(config.sources.len(), 3);

        let bva = &config.sources[0];
        assert_eq!(bva.skip_rows, 3);
        assert!(!bva.has_header);
        assert_eq!(
            bva.key,
            KeySpec::Fields {
                day: ColumnRef::Index(2),
                month: ColumnRef::Index(3),
                year: ColumnRef::Index(4),
            }
        );
        assert_eq!(bva.expected.convention, DateConvention::DayMonthYear);
        assert_eq!(bva.expected.valid_column, Some(ColumnRef::Index(6)));

        let comprehensive = &config.sources[1];
        assert!(comprehensive.has_header);
        assert_eq!(comprehensive.expected.column, ColumnRef::from("Expected Output"));

        let generated = &config.sources[2];
        assert_eq!(
            generated.key,
            KeySpec::Composite {
                column: ColumnRef::Index(1),
                convention: DateConvention::YearMonthDay,
            }
        );
        assert_eq!(generated.delimiter_byte().unwrap(), Some(b','));
        assert_eq!(generated.conventions(), Conventions::uniform(DateConvention::YearMonthDay));
    }

    #[test]
    fn reject_no_sources() {
        let err = SuiteConfig::from_toml("name = \"empty\"").unwrap_err();
        assert!(matches!(err, NextDateError::Config(_)));
    }

    #[test]
    fn reject_duplicate_names() {
        let input = r#"
[[sources]]
name = "a"
file = "a.csv"
key = { column = "input" }
expected = { column = "output" }

[[sources]]
name = "a"
file = "b.csv"
key = { column = "input" }
expected = { column = "output" }
"#;
        let err = SuiteConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("duplicate source name 'a'"));
    }

    #[test]
    fn reject_names_that_share_a_status() {
        let input = r#"
[[sources]]
name = "suite-a"
file = "a.csv"
key = { column = "input" }
expected = { column = "output" }

[[sources]]
name = "suite_a"
file = "b.csv"
key = { column = "input" }
expected = { column = "output" }
"#;
        let err = SuiteConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, NextDateError::Config(_)));
        assert!(err.to_string().contains("'suite-a' and 'suite_a'"));
    }

    #[test]
    fn reject_engine_name_when_oracle_enabled() {
        let source = r#"
[[sources]]
name = "computed-output"
file = "a.csv"
key = { column = "input" }
expected = { column = "output" }
"#;
        let err = SuiteConfig::from_toml(&format!("[oracle]\nenabled = true\n{}", source)).unwrap_err();
        assert!(err.to_string().contains("reserved"));

        assert!(SuiteConfig::from_toml(source).is_ok());
    }

    #[test]
    fn reject_named_column_without_header() {
        let input = r#"
[[sources]]
name = "a"
file = "a.csv"
has_header = false
key = { column = "input" }
expected = { column = 2 }
"#;
        assert!(SuiteConfig::from_toml(input).is_err());
    }

    #[test]
    fn reject_zero_position() {
        let input = r#"
[[sources]]
name = "a"
file = "a.csv"
has_header = false
key = { column = 0 }
expected = { column = 2 }
"#;
        let err = SuiteConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("1-based"));
    }

    #[test]
    fn reject_malformed_toml() {
        let err = SuiteConfig::from_toml("[[sources]\nname =").unwrap_err();
        assert!(matches!(err, NextDateError::ConfigParse(_)));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.toml");
        fs::write(&path, SUITES).unwrap();

        let config = SuiteConfig::load(&path).unwrap();
        assert_eq!(config.sources[0].file, dir.path().join("BVA_Next_Date.xlsx"));
    }
}
