/*!
 * verdict.rs — Severity classification of a thread pool row
 *
 * CRITICAL is checked before WARNING and only the worst level is
 * reported. Pending trips at or above its threshold; blocked must be
 * strictly above.
 *
 * License: GPLv3+
 */

use std::fmt;

use serde::Serialize;

use crate::report::ThreadPoolRow;
use crate::thresholds::{Threshold, ThresholdConfig};

/// Check result level, ordered by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Conventional monitoring plugin exit code.
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The metric that produced a non-OK verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Pending,
    Blocked,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub severity: Severity,
    pub trigger: Option<Trigger>,
    pub row: ThreadPoolRow,
}

/// `{"thread": {...}}` wire shape.
#[derive(Serialize)]
struct Payload<'a> {
    thread: &'a ThreadPoolRow,
}

impl Verdict {
    /// The JSON payload, counters rendered as the report's own digits.
    pub fn payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Payload { thread: &self.row })
    }

    /// Short human summary, e.g. `ReadStage pending 25 >= 15`.
    pub fn summary(&self, config: &ThresholdConfig) -> String {
        let row = &self.row;
        let (pending_limit, blocked_limit) = match self.severity {
            Severity::Critical => (config.critical_pending, config.critical_blocked),
            _ => (config.warning_pending, config.warning_blocked),
        };
        match self.trigger {
            Some(Trigger::Pending) => format!(
                "{} pending {} >= {}",
                row.stage,
                row.pending.raw(),
                pending_limit
            ),
            Some(Trigger::Blocked) => format!(
                "{} blocked {} > {}",
                row.stage,
                row.blocked.raw(),
                blocked_limit
            ),
            None => format!(
                "{} pending {} blocked {}",
                row.stage,
                row.pending.raw(),
                row.blocked.raw()
            ),
        }
    }
}

/// Which metric, if any, trips this pair of thresholds.
fn check_tier(row: &ThreadPoolRow, pending: Threshold, blocked: Threshold) -> Option<Trigger> {
    if pending.reached_by(row.pending.value()) {
        Some(Trigger::Pending)
    } else if blocked.exceeded_by(row.blocked.value()) {
        Some(Trigger::Blocked)
    } else {
        None
    }
}

/// Classify a row against thresholds.
///
/// # Arguments
/// * `row`    — Parsed stage counters
/// * `config` — Thresholds for this run
pub fn evaluate(row: ThreadPoolRow, config: ThresholdConfig) -> Verdict {
    let tiers = [
        (
            Severity::Critical,
            config.critical_pending,
            config.critical_blocked,
        ),
        (
            Severity::Warning,
            config.warning_pending,
            config.warning_blocked,
        ),
    ];

    for (severity, pending, blocked) in tiers {
        if let Some(trigger) = check_tier(&row, pending, blocked) {
            return Verdict {
                severity,
                trigger: Some(trigger),
                row,
            };
        }
    }

    Verdict {
        severity: Severity::Ok,
        trigger: None,
        row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse;
    use crate::stage::Stage;

    fn row(pending: u64, blocked: u64) -> ThreadPoolRow {
        let line = format!("ReadStage 0 {} 282971 {} 0", pending, blocked);
        parse(&line, Stage::ReadStage).unwrap()
    }

    fn config(wp: i64, cp: i64, wb: i64, cb: i64) -> ThresholdConfig {
        ThresholdConfig {
            warning_pending: wp.into(),
            critical_pending: cp.into(),
            warning_blocked: wb.into(),
            critical_blocked: cb.into(),
        }
    }

    #[test]
    fn pending_at_critical_is_critical() {
        let v = evaluate(row(25, 0), config(10, 15, -1, 0));
        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.trigger, Some(Trigger::Pending));
        assert_eq!(
            v.payload().unwrap(),
            r#"{"thread":{"stage":"ReadStage","active":"0","pending":"25","completed":"282971","blocked":"0"}}"#
        );
    }

    #[test]
    fn blocked_equal_to_threshold_is_ok() {
        let v = evaluate(row(25, 0), config(-1, -1, -1, 0));
        assert_eq!(v.severity, Severity::Ok);
        assert_eq!(v.trigger, None);
    }

    #[test]
    fn boundaries() {
        assert_eq!(evaluate(row(15, 0), config(-1, 15, -1, -1)).severity, Severity::Critical);
        assert_eq!(evaluate(row(14, 0), config(-1, 15, -1, -1)).severity, Severity::Ok);
        assert_eq!(evaluate(row(0, 3), config(-1, -1, -1, 3)).severity, Severity::Ok);
        assert_eq!(evaluate(row(0, 4), config(-1, -1, -1, 3)).severity, Severity::Critical);
    }

    #[test]
    fn warning_tier() {
        let v = evaluate(row(12, 0), config(10, 15, -1, 0));
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.trigger, Some(Trigger::Pending));

        let v = evaluate(row(0, 2), config(-1, -1, 1, 5));
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.trigger, Some(Trigger::Blocked));
    }

    #[test]
    fn critical_beats_warning() {
        let v = evaluate(row(100, 100), config(1, 50, 1, 50));
        assert_eq!(v.severity, Severity::Critical);
    }

    #[test]
    fn inverted_thresholds_resolve_by_precedence() {
        // warning above critical: anything past critical is critical.
        let cfg = config(20, 10, -1, -1);
        assert_eq!(evaluate(row(25, 0), cfg).severity, Severity::Critical);
        assert_eq!(evaluate(row(12, 0), cfg).severity, Severity::Critical);
        assert_eq!(evaluate(row(5, 0), cfg).severity, Severity::Ok);
    }

    #[test]
    fn blocked_trigger_when_pending_is_fine() {
        let v = evaluate(row(0, 1), ThresholdConfig::default());
        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.trigger, Some(Trigger::Blocked));
        assert_eq!(v.summary(&ThresholdConfig::default()), "ReadStage blocked 1 > 0");
    }

    #[test]
    fn summaries() {
        let cfg = config(10, 15, -1, 0);
        assert_eq!(evaluate(row(25, 0), cfg).summary(&cfg), "ReadStage pending 25 >= 15");
        assert_eq!(evaluate(row(11, 0), cfg).summary(&cfg), "ReadStage pending 11 >= 10");
        assert_eq!(evaluate(row(1, 0), cfg).summary(&cfg), "ReadStage pending 1 blocked 0");
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Severity::Ok.exit_code(), 0);
        assert_eq!(Severity::Warning.exit_code(), 1);
        assert_eq!(Severity::Critical.exit_code(), 2);
        assert_eq!(Severity::Unknown.exit_code(), 3);
        assert!(Severity::Critical > Severity::Warning);
    }
}
