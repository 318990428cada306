//! CLI command implementations.

pub mod boundaries;
pub mod compare;
pub mod generate;
pub mod grade;
pub mod next;

use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::debug;
use nextdate::config::OracleConfig;
use nextdate::{
    DateConvention, Reconciliation, ReconciliationOutcome, SourceSpec, SuiteConfig, Summary,
};

/// Where a command's suites come from: a TOML config or bare files.
pub struct SuiteInput {
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub convention: DateConvention,
    pub header: bool,
}

impl SuiteInput {
    /// Resolve to a validated suite config.
    pub fn into_suite(self, name: &str) -> Result<SuiteConfig, Box<dyn std::error::Error>> {
        if let Some(path) = self.config {
            let suite = SuiteConfig::load(&path)?;
            debug!(config = %path.display(), sources = suite.sources.len(), "loaded suite config");
            return Ok(suite);
        }

        let suite = SuiteConfig {
            name: name.to_string(),
            oracle: OracleConfig::default(),
            sources: self
                .files
                .iter()
                .map(|file| file_source(file, self.convention, self.header))
                .collect(),
        };
        suite.validate()?;
        Ok(suite)
    }
}

/// A two-column `input,expected` file, tagged with its file stem.
pub fn file_source(path: &Path, convention: DateConvention, header: bool) -> SourceSpec {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    named_file_source(name, path, convention, header)
}

pub fn named_file_source(
    name: impl Into<String>,
    path: &Path,
    convention: DateConvention,
    header: bool,
) -> SourceSpec {
    SourceSpec {
        has_header: header,
        ..SourceSpec::delimited(name, path, 1usize, 2usize, convention)
    }
}

pub fn print_summary(summary: &Summary) {
    println!("{}", "Summary:".yellow().bold());
    println!("  Total keys:  {}", summary.total_keys.to_string().white().bold());
    println!("  Matches:     {}", summary.matches.to_string().green());
    println!("  Mismatches:  {}", summary.mismatches.to_string().red());
    for (source, count) in &summary.only_in {
        println!("  Only in {:<20} {}", format!("{}:", source), count.to_string().blue());
    }

    let accuracy = summary.overlap_accuracy.to_string();
    let accuracy = match summary.overlap_accuracy.percent() {
        Some(p) if p >= 90.0 => accuracy.green(),
        Some(p) if p >= 70.0 => accuracy.yellow(),
        Some(_) => accuracy.red(),
        None => accuracy.dimmed(),
    };
    println!(
        "  Overlap accuracy: {} ({} overlapping keys)",
        accuracy, summary.overlap
    );
}

/// Print mismatching keys with each source's claim, up to `limit`.
pub fn print_mismatches(reconciliation: &Reconciliation, limit: usize) {
    let mismatches: Vec<_> = reconciliation.mismatches().collect();
    if mismatches.is_empty() {
        return;
    }

    println!();
    println!("{}", "Mismatches:".yellow().bold());
    for outcome in mismatches.iter().take(limit) {
        if let ReconciliationOutcome::Mismatch { key, values } = outcome {
            println!("  {}", key.to_string().white().bold());
            for (source, value) in values {
                println!("    {:<24} {}", source.to_string().dimmed(), value);
            }
        }
    }
    if mismatches.len() > limit {
        println!("  ... and {} more", mismatches.len() - limit);
    }
}
