//! Record model and the normalization boundary.

mod model;
mod normalize;

pub use model::{DiagnosticKind, Expected, ParseDiagnostic, SourceTag, TestCase};
pub use normalize::{
    is_invalid_token, normalize, normalize_rows, parse_int_cell, Conventions, NormalizedBatch,
    RawExpected, RawKey, RawRecord,
};
