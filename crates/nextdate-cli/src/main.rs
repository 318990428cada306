//! nextdate CLI - next-date oracle and test suite reconciliation.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use nextdate::NextDateError;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Next {
            date,
            day,
            month,
            year,
            convention,
        } => commands::next::run(date, day, month, year, convention),

        Commands::Generate {
            count,
            provider,
            model,
            api_key,
            output,
            upload,
            json,
        } => commands::generate::run(
            commands::generate::GenerateArgs {
                count,
                provider,
                model,
                api_key,
                output,
                upload,
            },
            json,
            cli.verbose,
        ),

        Commands::Compare {
            files,
            config,
            convention,
            header,
            with_oracle,
            output,
            json,
        } => commands::compare::run(
            commands::SuiteInput {
                files,
                config,
                convention,
                header,
            },
            with_oracle,
            output,
            json,
            cli.verbose,
        ),

        Commands::Grade {
            file,
            convention,
            header,
            output,
            json,
        } => commands::grade::run(file, convention, header, output, json, cli.verbose),

        Commands::Boundaries {
            files,
            config,
            convention,
            header,
            json,
        } => commands::boundaries::run(
            commands::SuiteInput {
                files,
                config,
                convention,
                header,
            },
            json,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(e.as_ref()));
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 2 missing credentials, 3 missing input file, 4 invalid configuration, 1 anything else.
fn exit_code(error: &(dyn std::error::Error + 'static)) -> i32 {
    match error.downcast_ref::<NextDateError>() {
        Some(NextDateError::MissingCredential(_)) => 2,
        Some(NextDateError::FileNotFound(_)) => 3,
        Some(NextDateError::Config(_)) | Some(NextDateError::ConfigParse(_)) => 4,
        _ => 1,
    }
}
