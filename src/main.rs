/*!
 * check-tpstats — thread pool stage check for `nodetool tpstats`
 *
 * Usage:
 *   check-tpstats --stage <STAGE> [options]
 *
 * Prints one status line on stdout and exits with the usual plugin codes:
 * 0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN. Diagnostics go to stderr;
 * set RUST_LOG to tune them or TPSTATS_LOG_FORMAT=json for JSON lines.
 *
 * License: GPLv3+
 */

use std::process;

use check_tpstats::cli::{self, CheckOutput, Cli};
use check_tpstats::CheckError;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up stderr logging. `--verbose` raises the default level to debug;
/// an explicit RUST_LOG always wins.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "check_tpstats=debug"
    } else {
        "check_tpstats=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    let json = std::env::var("TPSTATS_LOG_FORMAT").is_ok_and(|v| v == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Print the status line and exit with its code. (Never returns.)
fn finish(output: CheckOutput) -> ! {
    println!("{}", output.status_line());
    process::exit(output.severity.exit_code());
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            let first = e.to_string();
            let first = first.lines().next().unwrap_or("invalid arguments");
            finish(CheckOutput::from_error(&CheckError::Usage(
                first.trim_start_matches("error: ").to_string(),
            )))
        }
    };

    init_logging(cli.verbose);

    let output = match cli::execute(&cli) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "check failed");
            CheckOutput::from_error(&e)
        }
    };
    finish(output)
}
