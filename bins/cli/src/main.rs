//! CLI binary entrypoint.

mod error;

use clap::Parser;
use error::{CliError, ExitCode};
use instance_catalog_infra::{RunOptions, load_app_config_std_env, run_list_included};
use instance_catalog_shared::ErrorEnvelope;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(
    name = "instance-catalog",
    version,
    about = "Count the hvm instance types a cloud catalog offers, minus an exclude list",
    long_about = None
)]
struct Cli {
    /// Write a profile of the whole run (JSON-lines telemetry) to FILE.
    #[arg(long, value_name = "FILE")]
    cpuprofile: Option<PathBuf>,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let output = run(&cli);
    match write_output(&output) {
        Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
        Err(error) => exit_with_error(&error),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(cli: &Cli) -> CliOutput {
    let config = match load_app_config_std_env() {
        Ok(config) => config,
        Err(error) => return format_error_output(&error),
    };
    let options = RunOptions {
        profile_path: cli.cpuprofile.clone(),
    };

    match run_list_included(&config, &options) {
        Ok(report) => {
            tracing::debug!(
                pages = report.stats.pages,
                fetched = report.stats.fetched,
                excluded = report.stats.excluded,
                "listing finished"
            );
            CliOutput {
                stdout: format!("{}\n", report.count),
                stderr: String::new(),
                exit_code: ExitCode::Ok,
            }
        },
        Err(error) => format_error_output(&error),
    }
}

/// Catalog fetch failures go to stdout; every other failure goes to stderr.
fn format_error_output(error: &ErrorEnvelope) -> CliOutput {
    let exit_code = ExitCode::for_envelope(error);
    let line = format!("{}\n", error.message);
    if exit_code == ExitCode::CatalogFetch {
        CliOutput {
            stdout: line,
            stderr: String::new(),
            exit_code,
        }
    } else {
        CliOutput {
            stdout: String::new(),
            stderr: format!("error: {line}"),
            exit_code,
        }
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    if !output.stdout.is_empty() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.stdout.as_bytes())?;
        stdout.flush()?;
    }
    if !output.stderr.is_empty() {
        io::stderr().write_all(output.stderr.as_bytes())?;
    }
    Ok(())
}
