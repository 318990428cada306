//! Reconciliation: classify keys across sources and summarize.

mod engine;
mod metrics;
mod outcome;

pub use engine::{reconcile, reconcile_index};
pub use metrics::{summarize, OverlapAccuracy, Summary};
pub use outcome::{Reconciliation, ReconciliationOutcome};
