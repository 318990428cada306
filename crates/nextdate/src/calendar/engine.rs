//! Gregorian validity and successor rules.
//!
//! This is the only place in the crate that decides whether a date is valid
//! or what comes after it. Everything else compares labels produced here.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::date::DateKey;

/// Days per month in a common year, January first.
const DAYS_IN_MONTH: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Outcome of advancing a date by one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "next", rename_all = "snake_case")]
pub enum CalendarResult {
    /// The input was a real date; this is the following day.
    Valid(DateKey),
    /// The input was not a real date (or its successor is unrepresentable).
    Invalid,
}

impl CalendarResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, CalendarResult::Valid(_))
    }

    /// The successor date, if any.
    pub fn next(&self) -> Option<DateKey> {
        match self {
            CalendarResult::Valid(key) => Some(*key),
            CalendarResult::Invalid => None,
        }
    }
}

impl fmt::Display for CalendarResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarResult::Valid(key) => write!(f, "{}", key),
            CalendarResult::Invalid => f.write_str("INVALID"),
        }
    }
}

/// Gregorian leap-year rule, including the century exception.
///
/// Uses Euclidean remainders so proleptic (zero and negative) years follow
/// the same 4/100/400 cycle.
pub fn is_leap_year(year: i64) -> bool {
    (year.rem_euclid(4) == 0 && year.rem_euclid(100) != 0) || year.rem_euclid(400) == 0
}

/// Number of days in `month` of `year`, or `None` when the month is out of range.
pub fn days_in_month(month: i64, year: i64) -> Option<i64> {
    if !(1..=12).contains(&month) {
        return None;
    }
    if month == 2 && is_leap_year(year) {
        return Some(29);
    }
    Some(DAYS_IN_MONTH[(month - 1) as usize])
}

/// Whether (day, month, year) names a real Gregorian date.
pub fn is_valid(day: i64, month: i64, year: i64) -> bool {
    days_in_month(month, year).is_some_and(|dim| (1..=dim).contains(&day))
}

/// Advance a date by one day.
///
/// Never panics: malformed input, and the last day of the largest
/// representable year, both classify as [`CalendarResult::Invalid`].
pub fn next_date(day: i64, month: i64, year: i64) -> CalendarResult {
    let Some(dim) = days_in_month(month, year) else {
        return CalendarResult::Invalid;
    };
    if !(1..=dim).contains(&day) {
        return CalendarResult::Invalid;
    }

    if day < dim {
        CalendarResult::Valid(DateKey::new(day + 1, month, year))
    } else if month < 12 {
        CalendarResult::Valid(DateKey::new(1, month + 1, year))
    } else {
        match year.checked_add(1) {
            Some(next_year) => CalendarResult::Valid(DateKey::new(1, 1, next_year)),
            None => CalendarResult::Invalid,
        }
    }
}

/// [`next_date`] for an existing key.
pub fn next_date_for(key: &DateKey) -> CalendarResult {
    next_date(key.day(), key.month(), key.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(day: i64, month: i64, year: i64) -> CalendarResult {
        CalendarResult::Valid(DateKey::new(day, month, year))
    }

    #[test]
    fn test_leap_years() {
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(2100));
        assert!(is_leap_year(1600));
        assert!(is_leap_year(0));
        assert!(is_leap_year(-4));
        assert!(!is_leap_year(-100));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(1, 2023), Some(31));
        assert_eq!(days_in_month(2, 2023), Some(28));
        assert_eq!(days_in_month(2, 2024), Some(29));
        assert_eq!(days_in_month(4, 2021), Some(30));
        assert_eq!(days_in_month(12, 2021), Some(31));
        assert_eq!(days_in_month(0, 2021), None);
        assert_eq!(days_in_month(13, 2021), None);
    }

    #[test]
    fn test_february_transitions() {
        assert_eq!(next_date(28, 2, 2023), valid(1, 3, 2023));
        assert_eq!(next_date(28, 2, 2024), valid(29, 2, 2024));
        assert_eq!(next_date(29, 2, 2024), valid(1, 3, 2024));
        assert_eq!(next_date(29, 2, 2023), CalendarResult::Invalid);
        assert_eq!(next_date(29, 2, 1900), CalendarResult::Invalid);
        assert_eq!(next_date(29, 2, 2000), valid(1, 3, 2000));
    }

    #[test]
    fn test_month_and_year_rollover() {
        assert_eq!(next_date(31, 12, 1999), valid(1, 1, 2000));
        assert_eq!(next_date(30, 4, 2021), valid(1, 5, 2021));
        assert_eq!(next_date(31, 4, 2021), CalendarResult::Invalid);
        assert_eq!(next_date(31, 1, 2021), valid(1, 2, 2021));
        assert_eq!(next_date(15, 6, 2021), valid(16, 6, 2021));
    }

    #[test]
    fn test_out_of_range_inputs_are_invalid() {
        assert_eq!(next_date(0, 1, 2021), CalendarResult::Invalid);
        assert_eq!(next_date(32, 1, 2021), CalendarResult::Invalid);
        assert_eq!(next_date(1, 0, 2021), CalendarResult::Invalid);
        assert_eq!(next_date(1, 13, 2021), CalendarResult::Invalid);
        assert_eq!(next_date(-1, -1, -1), CalendarResult::Invalid);
        assert_eq!(next_date(i64::MIN, i64::MIN, i64::MIN), CalendarResult::Invalid);
    }

    #[test]
    fn test_extreme_years() {
        assert_eq!(next_date(31, 12, i64::MAX), CalendarResult::Invalid);
        assert_eq!(next_date(30, 12, i64::MAX), valid(31, 12, i64::MAX));
        assert_eq!(next_date(31, 12, -1), valid(1, 1, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(valid(1, 3, 2023).to_string(), "2023-03-01");
        assert_eq!(CalendarResult::Invalid.to_string(), "INVALID");
    }
}
