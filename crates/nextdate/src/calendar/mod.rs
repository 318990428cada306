//! Gregorian calendar engine: date keys, validity, successors, boundaries.

mod boundary;
mod date;
mod engine;

pub use boundary::{classify_boundary, coverage, BoundaryCoverage, BoundaryKind};
pub use date::{DateConvention, DateKey};
pub use engine::{days_in_month, is_leap_year, is_valid, next_date, next_date_for, CalendarResult};
