//! Compare command - n-way reconciliation of test suites.

use std::path::PathBuf;

use colored::Colorize;
use nextdate::output::write_comparison_file;
use nextdate::Harness;

use super::{print_mismatches, print_summary, SuiteInput};

pub fn run(
    input: SuiteInput,
    with_oracle: bool,
    output: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let suite = input.into_suite("compare")?;

    if !json_output {
        println!(
            "{} {} sources",
            "Reconciling".cyan().bold(),
            suite.sources.len().to_string().white().bold()
        );
    }

    let harness = Harness::from_suite(&suite).with_oracle(suite.oracle.enabled || with_oracle);
    let report = harness.run()?;

    write_comparison_file(&output, &report.reconciliation)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("{}", "Sources:".yellow().bold());
    for source in &report.sources {
        let skipped = source
            .diagnostics
            .iter()
            .filter(|d| d.kind == nextdate::record::DiagnosticKind::SkippedRow)
            .count();
        let file = source
            .metadata
            .as_ref()
            .map(|m| m.file.clone())
            .unwrap_or_default();
        println!(
            "  {:<24} {:>6} cases  {:>4} skipped  {}",
            source.source.to_string().white(),
            source.cases,
            skipped,
            file.dimmed()
        );
        if verbose {
            for diag in &source.diagnostics {
                println!("    {}", diag.to_string().dimmed());
            }
        }
    }

    if !report.duplicates.is_empty() {
        println!(
            "{} duplicate keys within a source (later rows kept)",
            report.duplicates.len().to_string().yellow()
        );
    }

    println!();
    print_summary(&report.summary);
    print_mismatches(&report.reconciliation, if verbose { usize::MAX } else { 10 });

    println!();
    println!(
        "Detailed comparison saved to: {}",
        output.display().to_string().white()
    );

    Ok(())
}
