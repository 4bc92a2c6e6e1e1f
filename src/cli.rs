/*!
 * cli.rs — Command line surface of check-tpstats
 *
 * Usage:
 *   check-tpstats --stage ReadStage [--host H] [--port P]
 *                 [--warning-pending N] [--critical-pending N]
 *                 [--warning-blocked N] [--critical-blocked N]
 *                 [--config thresholds.toml] [--report-file tpstats.txt]
 *
 * License: GPLv3+
 */

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::debug;

use crate::error::CheckError;
use crate::nodetool::{Nodetool, ReportFile, ReportSource};
use crate::stage::Stage;
use crate::thresholds::{load_thresholds_from_file, ThresholdConfig, ThresholdOverrides};
use crate::verdict::{Severity, Verdict};

/// Name printed at the start of every status line.
pub const CHECK_NAME: &str = "CheckTpstats";

/// Alert on pending or blocked tasks in one thread pool stage,
/// as reported by `nodetool tpstats`.
///
/// Threshold flags take -1 to disable. Thresholds from --config are
/// applied first, explicit flags override them.
#[derive(Parser, Debug)]
#[command(name = "check-tpstats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Node to query
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// Node admin (JMX) port
    #[arg(short = 'P', long, default_value_t = 7199)]
    pub port: u16,

    /// Stage to check, e.g. ReadStage or MutationStage
    #[arg(short, long)]
    pub stage: Option<String>,

    /// Pending tasks at which to warn [default: -1]
    #[arg(long, allow_negative_numbers = true, value_name = "N")]
    pub warning_pending: Option<i64>,

    /// Pending tasks at which to go critical [default: 15]
    #[arg(long, allow_negative_numbers = true, value_name = "N")]
    pub critical_pending: Option<i64>,

    /// Warn when blocked tasks exceed this [default: -1]
    #[arg(long, allow_negative_numbers = true, value_name = "N")]
    pub warning_blocked: Option<i64>,

    /// Go critical when blocked tasks exceed this [default: 0]
    #[arg(long, allow_negative_numbers = true, value_name = "N")]
    pub critical_blocked: Option<i64>,

    /// TOML file with threshold values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// nodetool executable
    #[arg(long, default_value = "nodetool", value_name = "PATH")]
    pub nodetool: String,

    /// Seconds to wait for nodetool before giving up
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Read a saved tpstats report instead of running nodetool
    #[arg(long, value_name = "FILE")]
    pub report_file: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The validated target stage.
    pub fn stage(&self) -> Result<Stage, CheckError> {
        self.stage
            .as_deref()
            .ok_or(CheckError::MissingStage)?
            .parse()
    }

    fn overrides(&self) -> ThresholdOverrides {
        ThresholdOverrides {
            warning_pending: self.warning_pending,
            critical_pending: self.critical_pending,
            warning_blocked: self.warning_blocked,
            critical_blocked: self.critical_blocked,
        }
    }

    /// Defaults, then --config, then explicit flags.
    pub fn thresholds(&self) -> Result<ThresholdConfig, CheckError> {
        let base = match &self.config {
            Some(path) => load_thresholds_from_file(path)?,
            None => ThresholdConfig::default(),
        };
        Ok(base.with_overrides(self.overrides()))
    }

    pub fn source(&self) -> Box<dyn ReportSource> {
        match &self.report_file {
            Some(path) => Box::new(ReportFile { path: path.clone() }),
            None => Box::new(Nodetool {
                program: self.nodetool.clone(),
                host: self.host.clone(),
                port: self.port,
                timeout: Duration::from_secs(self.timeout),
            }),
        }
    }
}

/// A finished check, ready to print.
#[derive(Debug)]
pub struct CheckOutput {
    pub severity: Severity,
    pub message: String,
}

impl CheckOutput {
    pub fn from_verdict(verdict: &Verdict) -> Result<Self, CheckError> {
        Ok(CheckOutput {
            severity: verdict.severity,
            message: verdict.payload()?,
        })
    }

    pub fn from_error(err: &CheckError) -> Self {
        CheckOutput {
            severity: Severity::Unknown,
            message: err.to_string(),
        }
    }

    /// `CheckTpstats CRITICAL: {"thread":{...}}`
    pub fn status_line(&self) -> String {
        format!("{} {}: {}", CHECK_NAME, self.severity, self.message)
    }
}

/// Run the whole check described by the command line.
pub fn execute(cli: &Cli) -> Result<CheckOutput, CheckError> {
    // Stage is validated before anything touches the network or disk.
    let stage = cli.stage()?;
    let thresholds = cli.thresholds()?;
    debug!(
        %stage,
        warning_pending = %thresholds.warning_pending,
        critical_pending = %thresholds.critical_pending,
        warning_blocked = %thresholds.warning_blocked,
        critical_blocked = %thresholds.critical_blocked,
        "resolved thresholds"
    );

    let source = cli.source();
    let verdict = crate::check(source.as_ref(), stage, thresholds)?;
    CheckOutput::from_verdict(&verdict)
}
