//! Grade command - check a suite against the calendar engine.

use std::path::PathBuf;

use colored::Colorize;
use nextdate::output::write_graded_file;
use nextdate::{grade, load_source, DateConvention, Verdict};

use super::file_source;

pub fn run(
    file: PathBuf,
    convention: DateConvention,
    header: bool,
    output: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_source(&file_source(&file, convention, header))?;
    let report = grade(&loaded.batch.cases);

    if let Some(path) = &output {
        write_graded_file(path, &report)?;
    }

    if json_output {
        let out = serde_json::json!({
            "source": loaded.metadata,
            "diagnostics": loaded.batch.diagnostics,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Grading".cyan().bold(),
        file.display().to_string().white()
    );
    println!(
        "  Passed:   {}",
        report.passed.to_string().green()
    );
    println!("  Failed:   {}", report.failed.to_string().red());
    println!("  Unjudged: {}", report.unjudged.to_string().dimmed());
    if loaded.batch.skipped() > 0 {
        println!("  Skipped rows: {}", loaded.batch.skipped().to_string().yellow());
    }

    let limit = if verbose { usize::MAX } else { 10 };
    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("{}", "Failures:".yellow().bold());
        for graded in failures.iter().take(limit) {
            if let Verdict::Fail { actual } = &graded.verdict {
                println!(
                    "  {}  claimed {}  actual {}",
                    graded.case.key.to_string().white().bold(),
                    graded.case.expected.to_string().red(),
                    actual.to_string().green()
                );
            }
        }
        if failures.len() > limit {
            println!("  ... and {} more", failures.len() - limit);
        }
    }

    if let Some(path) = output {
        println!();
        println!("Graded cases saved to: {}", path.display().to_string().white());
    }

    Ok(())
}
