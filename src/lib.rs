/*!
 * check-tpstats — thread pool stage check for `nodetool tpstats`
 *
 * Fetches the tpstats report for a node, picks out one stage's row and
 * rates its pending and blocked counters as OK, WARNING or CRITICAL.
 *
 * License: GPLv3+
 */

pub mod cli;
pub mod error;
pub mod nodetool;
pub mod report;
pub mod stage;
pub mod thresholds;
pub mod verdict;

use tracing::{debug, info};

pub use error::CheckError;
pub use nodetool::{Nodetool, ReportFile, ReportSource};
pub use report::{parse, parse_all, Counter, ThreadPoolRow};
pub use stage::Stage;
pub use thresholds::{Threshold, ThresholdConfig};
pub use verdict::{evaluate, Severity, Trigger, Verdict};

/// Fetch, parse and evaluate one stage.
///
/// A report without a row for `stage` is an error: the check has nothing
/// to rate, which is reported as UNKNOWN rather than a silent OK.
pub fn check(
    source: &dyn ReportSource,
    stage: Stage,
    thresholds: ThresholdConfig,
) -> Result<Verdict, CheckError> {
    let report = source.fetch()?;
    debug!(source = %source.describe(), bytes = report.len(), "fetched tpstats");

    if tracing::enabled!(tracing::Level::DEBUG) {
        for row in parse_all(&report) {
            debug!(
                stage = %row.stage,
                active = row.active.value(),
                pending = row.pending.value(),
                blocked = row.blocked.value(),
                "pool"
            );
        }
    }

    let row = parse(&report, stage).ok_or(CheckError::StageNotFound(stage))?;
    let verdict = evaluate(row, thresholds);
    info!(
        %stage,
        severity = %verdict.severity,
        trigger = ?verdict.trigger,
        "{}",
        verdict.summary(&thresholds)
    );
    Ok(verdict)
}
