//! Generate command - request test cases and save them.

use std::path::PathBuf;

use colored::Colorize;
use nextdate::llm::{build_generator, generated_cases, GenerationConfig, ProviderKind};
use nextdate::output::write_cases_file;
use nextdate::{DateConvention, Harness, NextDateError};

use super::{named_file_source, print_mismatches, print_summary};

/// Tag for the file passed with `--upload`.
const UPLOADED: &str = "uploaded";

pub struct GenerateArgs {
    pub count: usize,
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub output: PathBuf,
    pub upload: Option<PathBuf>,
}

pub fn run(
    args: GenerateArgs,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GenerationConfig::default();
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }

    let generator = build_generator(args.provider, args.api_key.as_deref(), config)?;

    if !json_output {
        println!(
            "{} {} cases from {}",
            "Requesting".cyan().bold(),
            args.count.to_string().white().bold(),
            generator.name().white()
        );
    }

    let batch = generator.generate(args.count)?;
    write_cases_file(&args.output, &batch.pairs)?;

    let normalized = generated_cases(&batch);

    if !json_output {
        println!(
            "Saved {} cases to {}",
            batch.pairs.len().to_string().green(),
            args.output.display().to_string().white()
        );
        if !batch.diagnostics.is_empty() {
            println!(
                "Ignored {} reply lines that were not input,expected pairs",
                batch.diagnostics.len().to_string().yellow()
            );
        }
        if normalized.skipped() > 0 || normalized.unparsed() > 0 {
            println!(
                "{} rows skipped, {} expected values unparsed",
                normalized.skipped().to_string().yellow(),
                normalized.unparsed().to_string().yellow()
            );
        }
        if verbose {
            for diag in &normalized.diagnostics {
                println!("  {}", diag.to_string().dimmed());
            }
            for message in &batch.diagnostics {
                println!("  {}", message.dimmed());
            }
        }
    }

    let Some(upload) = args.upload else {
        if json_output {
            let out = serde_json::json!({
                "provider": generator.name(),
                "output": args.output,
                "pairs": batch.pairs.len(),
                "ignored_lines": batch.diagnostics,
                "diagnostics": normalized.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        return Ok(());
    };

    if !upload.exists() {
        return Err(NextDateError::FileNotFound(upload).into());
    }

    let report = Harness::new()
        .with_batch(normalized)
        .with_source(named_file_source(
            UPLOADED,
            &upload,
            DateConvention::YearMonthDay,
            false,
        ))
        .run()?;

    if json_output {
        let out = serde_json::json!({
            "provider": generator.name(),
            "output": args.output,
            "pairs": batch.pairs.len(),
            "ignored_lines": batch.diagnostics,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "{} generated cases against {}",
        "Reconciled".cyan().bold(),
        upload.display().to_string().white()
    );
    print_summary(&report.summary);
    print_mismatches(&report.reconciliation, if verbose { usize::MAX } else { 10 });

    Ok(())
}
