//! Date keys and the textual conventions used to spell them.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Composite date shapes, compiled once. Separators may be '-', '/' or '.'.
// Years carry at least four digits so that day-first and year-first strings
// can never be mistaken for one another.

static YEAR_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-]?\d{4,})[-/.](\d{1,2})[-/.](\d{1,2})$").unwrap());

static YEAR_LAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.]([+-]?\d{4,})$").unwrap());

/// An immutable (day, month, year) triple.
///
/// Keys are structural: two keys with the same fields are the same key no
/// matter which source produced them. A key need not be a valid calendar date;
/// `31/04/2021` is a perfectly good key whose successor is `Invalid`.
///
/// Ordering is chronological (year, then month, then day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateKey {
    day: i64,
    month: i64,
    year: i64,
}

impl DateKey {
    /// Create a key from its three fields.
    pub const fn new(day: i64, month: i64, year: i64) -> Self {
        Self { day, month, year }
    }

    pub const fn day(&self) -> i64 {
        self.day
    }

    pub const fn month(&self) -> i64 {
        self.month
    }

    pub const fn year(&self) -> i64 {
        self.year
    }

    /// Parse a composite date string written in the given convention.
    ///
    /// Returns `None` when the text is not three integers in the expected
    /// order. The result is not checked against the calendar.
    pub fn parse(text: &str, convention: DateConvention) -> Option<Self> {
        let text = text.trim();
        match convention {
            DateConvention::YearMonthDay => {
                let caps = YEAR_FIRST.captures(text)?;
                let year = caps[1].parse().ok()?;
                let month = caps[2].parse().ok()?;
                let day = caps[3].parse().ok()?;
                Some(Self::new(day, month, year))
            }
            DateConvention::DayMonthYear => {
                let caps = YEAR_LAST.captures(text)?;
                let day = caps[1].parse().ok()?;
                let month = caps[2].parse().ok()?;
                let year = caps[3].parse().ok()?;
                Some(Self::new(day, month, year))
            }
            DateConvention::MonthDayYear => {
                let caps = YEAR_LAST.captures(text)?;
                let month = caps[1].parse().ok()?;
                let day = caps[2].parse().ok()?;
                let year = caps[3].parse().ok()?;
                Some(Self::new(day, month, year))
            }
        }
    }

    /// Render the key in the given convention (`-` for year-first, `/` otherwise).
    pub fn format(&self, convention: DateConvention) -> String {
        let year = if self.year < 0 {
            format!("-{:04}", self.year.unsigned_abs())
        } else {
            format!("{:04}", self.year)
        };
        match convention {
            DateConvention::YearMonthDay => {
                format!("{}-{:02}-{:02}", year, self.month, self.day)
            }
            DateConvention::DayMonthYear => {
                format!("{:02}/{:02}/{}", self.day, self.month, year)
            }
            DateConvention::MonthDayYear => {
                format!("{:02}/{:02}/{}", self.month, self.day, year)
            }
        }
    }
}

impl PartialOrd for DateKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.month, self.day).cmp(&(other.year, other.month, other.day))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DateConvention::YearMonthDay))
    }
}

/// Field order of a composite date string.
///
/// Every source declares its convention; it is never inferred from content
/// because `03/04/2021` reads as two different dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateConvention {
    /// `YYYY-MM-DD`
    #[default]
    #[serde(alias = "ymd", alias = "iso")]
    YearMonthDay,
    /// `DD/MM/YYYY` or `DD-MM-YYYY`
    #[serde(alias = "dmy")]
    DayMonthYear,
    /// `MM/DD/YYYY`
    #[serde(alias = "mdy")]
    MonthDayYear,
}

impl DateConvention {
    pub fn label(&self) -> &'static str {
        match self {
            DateConvention::YearMonthDay => "year-month-day",
            DateConvention::DayMonthYear => "day-month-year",
            DateConvention::MonthDayYear => "month-day-year",
        }
    }
}

impl FromStr for DateConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "ymd" | "iso" | "year-month-day" | "yyyy-mm-dd" => Ok(DateConvention::YearMonthDay),
            "dmy" | "day-month-year" | "dd/mm/yyyy" | "dd-mm-yyyy" => {
                Ok(DateConvention::DayMonthYear)
            }
            "mdy" | "month-day-year" | "mm/dd/yyyy" => Ok(DateConvention::MonthDayYear),
            _ => Err(format!(
                "Unknown date convention: {}. Use ymd, dmy, or mdy.",
                s
            )),
        }
    }
}

impl fmt::Display for DateConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
