//! Demo: reconcile a suite file against mock-generated cases and the engine.
//!
//! Usage:
//!   cargo run --example compare -- <suite.csv> [corruption_rate]
//!
//! The suite file is headerless `input,expected` in `YYYY-MM-DD` form, the
//! same layout the `generate` command saves.

use std::env;
use std::path::Path;

use nextdate::llm::MockGenerator;
use nextdate::{DateConvention, Harness, HarnessConfig, ReconciliationOutcome, SourceSpec};

fn main() -> nextdate::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example compare -- <suite.csv> [corruption_rate]");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let corruption: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0.1);

    let mut suite = SourceSpec::delimited(
        "uploaded",
        path,
        1usize,
        2usize,
        DateConvention::YearMonthDay,
    );
    suite.has_header = false;

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Reconciling {} against mock cases ({:.0}% corrupted)", path.display(), corruption * 100.0);
    println!("{}", separator);
    println!();

    let report = Harness::with_config(HarnessConfig {
        oracle: true,
        generation_count: 60,
    })
    .with_source(suite)
    .with_generator(MockGenerator::new().with_corruption(corruption, 7))
    .run()?;

    for source in &report.sources {
        println!(
            "{:<24} {:>5} cases  {:>3} diagnostics",
            source.source.to_string(),
            source.cases,
            source.diagnostics.len()
        );
    }
    println!();

    println!("Keys:             {}", report.summary.total_keys);
    println!("Matches:          {}", report.summary.matches);
    println!("Mismatches:       {}", report.summary.mismatches);
    println!("Overlap accuracy: {}", report.summary.overlap_accuracy);
    println!();

    for outcome in report.reconciliation.mismatches() {
        if let ReconciliationOutcome::Mismatch { key, values } = outcome {
            let claims: Vec<String> = values
                .iter()
                .map(|(source, value)| format!("{}={}", source, value))
                .collect();
            println!("  {}  {}", key, claims.join("  "));
        }
    }

    Ok(())
}
