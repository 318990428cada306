//! Boundaries command - boundary-value coverage of each suite.

use colored::Colorize;
use nextdate::{coverage, load_source, BoundaryCoverage};

use super::SuiteInput;

pub fn run(input: SuiteInput, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let suite = input.into_suite("boundaries")?;

    let mut results: Vec<(String, BoundaryCoverage)> = Vec::new();
    for spec in &suite.sources {
        let loaded = load_source(spec)?;
        let report = coverage(loaded.batch.cases.iter().map(|c| &c.key));
        results.push((spec.name.clone(), report));
    }

    if json_output {
        let out: serde_json::Map<String, serde_json::Value> = results
            .into_iter()
            .map(|(name, report)| Ok((name, serde_json::to_value(report)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (name, report) in &results {
        println!(
            "{} {} ({} keys)",
            "Boundary coverage for".cyan().bold(),
            name.white(),
            report.total
        );

        for (kind, count) in &report.by_kind {
            println!("  {:<28} {}", kind.label(), count.to_string().green());
        }

        let missing = report.missing_kinds();
        if !missing.is_empty() {
            let labels: Vec<&str> = missing.iter().map(|k| k.label()).collect();
            println!("  {} {}", "Not covered:".red(), labels.join(", "));
        }

        println!(
            "  Leap years: {}",
            join_years(report.leap_years.iter().copied())
        );
        println!(
            "  Common years: {}",
            join_years(report.common_years.iter().copied())
        );
        if !report.year_transitions.is_empty() {
            let transitions: Vec<String> = report
                .year_transitions
                .iter()
                .map(|(from, to)| format!("{}->{}", from, to))
                .collect();
            println!("  Year transitions: {}", transitions.join(", "));
        }
        if !report.month_ends.is_empty() {
            let months: Vec<String> = report
                .month_ends
                .iter()
                .map(|(month, count)| format!("{}:{}", month, count))
                .collect();
            println!("  Month ends (month:count): {}", months.join(" "));
        }
        println!();
    }

    Ok(())
}

fn join_years(years: impl Iterator<Item = i64>) -> String {
    let years: Vec<String> = years.map(|y| y.to_string()).collect();
    if years.is_empty() {
        "-".dimmed().to_string()
    } else {
        years.join(", ")
    }
}
