//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use nextdate::llm::ProviderKind;
use nextdate::DateConvention;
use std::path::PathBuf;

/// nextdate: next-date oracle and test suite reconciliation
#[derive(Parser)]
#[command(name = "nextdate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the day after a date, or INVALID
    Next {
        /// Composite date in the chosen convention (e.g. 2024-02-28)
        #[arg(value_name = "DATE", required_unless_present_all = ["day", "month", "year"])]
        date: Option<String>,

        #[arg(long, conflicts_with = "date", requires_all = ["month", "year"], allow_hyphen_values = true)]
        day: Option<i64>,

        #[arg(long, conflicts_with = "date", allow_hyphen_values = true)]
        month: Option<i64>,

        #[arg(long, conflicts_with = "date", allow_hyphen_values = true)]
        year: Option<i64>,

        /// Field order of DATE (ymd, dmy, mdy)
        #[arg(short, long, default_value = "ymd")]
        convention: DateConvention,
    },

    /// Request test cases from a generation service and save them
    Generate {
        /// Number of cases to request
        #[arg(short = 'n', long, default_value = "50")]
        count: usize,

        /// Generation provider (gemini, anthropic, mock)
        #[arg(short, long, default_value = "gemini")]
        provider: ProviderKind,

        /// Model to use (provider-specific)
        #[arg(long)]
        model: Option<String>,

        /// API key (defaults to GEMINI_API_KEY / ANTHROPIC_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Where to save the generated cases
        #[arg(short, long, default_value = "generated_testcases.csv")]
        output: PathBuf,

        /// Reconcile the generated cases against this headerless input,expected file
        #[arg(long, value_name = "FILE")]
        upload: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconcile several test suites key by key
    Compare {
        /// Suite files (two columns: input, expected)
        #[arg(value_name = "FILE", required_unless_present = "config", conflicts_with = "config")]
        files: Vec<PathBuf>,

        /// Suite configuration file (TOML)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Date convention of FILE arguments
        #[arg(long, default_value = "ymd")]
        convention: DateConvention,

        /// FILE arguments start with a header row
        #[arg(long)]
        header: bool,

        /// Add the calendar engine as a `computed-output` source
        #[arg(long)]
        with_oracle: bool,

        /// Where to write the comparison table
        #[arg(short, long, default_value = "detailed_comparison_results.csv")]
        output: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grade a suite's expected outputs against the calendar engine
    Grade {
        /// Suite file (two columns: input, expected)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Date convention of FILE
        #[arg(long, default_value = "ymd")]
        convention: DateConvention,

        /// FILE starts with a header row
        #[arg(long)]
        header: bool,

        /// Where to write graded rows
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report which calendar boundaries a suite exercises
    Boundaries {
        /// Suite files (two columns: input, expected)
        #[arg(value_name = "FILE", required_unless_present = "config", conflicts_with = "config")]
        files: Vec<PathBuf>,

        /// Suite configuration file (TOML)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Date convention of FILE arguments
        #[arg(long, default_value = "ymd")]
        convention: DateConvention,

        /// FILE arguments start with a header row
        #[arg(long)]
        header: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
