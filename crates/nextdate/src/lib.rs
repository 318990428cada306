//! nextdate: a next-date oracle and multi-source test case reconciliation.
//!
//! Several independently written test suites for the "next date" problem
//! (hand-written boundary cases, a broad suite, model-generated cases) are
//! loaded, normalized onto a common [`DateKey`], and compared key by key.
//! The calendar engine is the one authority on what the successor of a date
//! actually is, and can join the comparison as its own source.
//!
//! # Example
//!
//! ```no_run
//! use nextdate::{Harness, SuiteConfig};
//!
//! let suite = SuiteConfig::load("suites.toml").unwrap();
//! let report = Harness::from_suite(&suite).run().unwrap();
//!
//! println!("Matches: {}", report.summary.matches);
//! println!("Overlap accuracy: {}", report.summary.overlap_accuracy);
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod index;
pub mod input;
pub mod llm;
pub mod oracle;
pub mod output;
pub mod reconcile;
pub mod record;

mod harness;

pub use crate::harness::{
    GenerationFailure, Harness, HarnessConfig, RunReport, SourceReport,
};
pub use calendar::{
    classify_boundary, coverage, is_leap_year, is_valid, next_date, next_date_for,
    BoundaryCoverage, BoundaryKind, CalendarResult, DateConvention, DateKey,
};
pub use config::{ColumnRef, ExpectedSpec, KeySpec, SourceSpec, SuiteConfig};
pub use error::{NextDateError, Result};
pub use index::{build_index, DuplicateKey, IndexBuild, MultiSourceIndex, SourceIndex};
pub use input::{load_source, LoadedSource, SourceMetadata, StructuredRow};
pub use oracle::{computed_source, grade, GradeReport, Verdict};
pub use reconcile::{
    reconcile, summarize, OverlapAccuracy, Reconciliation, ReconciliationOutcome, Summary,
};
pub use record::{Expected, NormalizedBatch, ParseDiagnostic, SourceTag, TestCase};
