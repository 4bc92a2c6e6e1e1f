/*!
 * report.rs — Thread pool row extraction from `nodetool tpstats` output
 *
 * The report is a plain text table:
 *
 *   Pool Name                    Active   Pending      Completed   Blocked  All time blocked
 *   ReadStage                         0        25         282971         0                 0
 *   ...
 *
 *   Message type           Dropped
 *   READ                         0
 *
 * Only the first table is of interest. Column values are kept both as the
 * digits printed by nodetool and as parsed integers.
 *
 * License: GPLv3+
 */

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::stage::Stage;

/// One row of the pool table: a name followed by exactly five integer
/// columns (active, pending, completed, blocked, all time blocked).
const ROW_PATTERN: &str = r"^\s*(\S+)\s+([0-9]+)\s+([0-9]+)\s+([0-9]+)\s+([0-9]+)\s+([0-9]+)\s*$";

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ROW_PATTERN).expect("valid regex"));

/// A counter column: nodetool's text plus its numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    raw: String,
    value: u64,
}

impl Counter {
    /// Parse a decimal column. Returns None if it isn't all digits or
    /// doesn't fit in a u64.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = raw.parse().ok()?;
        Some(Counter {
            raw: raw.to_string(),
            value,
        })
    }

    /// Text exactly as it appeared in the report (leading zeros included).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl Serialize for Counter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Counters for one stage. The all-time-blocked column is not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadPoolRow {
    pub stage: Stage,
    pub active: Counter,
    pub pending: Counter,
    pub completed: Counter,
    pub blocked: Counter,
}

/// What a single report line turned out to be.
enum Line<'a> {
    PoolHeader,
    MessageHeader,
    Row(&'a str, [&'a str; 4]),
    Other,
}

fn classify(line: &str) -> Line<'_> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some("Pool"), Some("Name")) => return Line::PoolHeader,
        (Some("Message"), Some("type")) => return Line::MessageHeader,
        _ => {}
    }

    match ROW_RE.captures(line) {
        Some(caps) => {
            let col = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            Line::Row(col(1), [col(2), col(3), col(4), col(5)])
        }
        None => Line::Other,
    }
}

fn build_row(stage: Stage, cols: [&str; 4]) -> Option<ThreadPoolRow> {
    let [active, pending, completed, blocked] = cols;
    Some(ThreadPoolRow {
        stage,
        active: Counter::parse(active)?,
        pending: Counter::parse(pending)?,
        completed: Counter::parse(completed)?,
        blocked: Counter::parse(blocked)?,
    })
}

/// Walk the pool table, handing each (name, columns) row to `visit` until
/// it returns Some. Stops at the message table.
fn scan<'a, T>(
    report: &'a str,
    mut visit: impl FnMut(&'a str, [&'a str; 4]) -> Option<T>,
) -> Option<T> {
    for line in report.lines() {
        match classify(line) {
            Line::PoolHeader | Line::Other => continue,
            Line::MessageHeader => break,
            Line::Row(name, cols) => {
                if let Some(found) = visit(name, cols) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Find the row for `stage` in a tpstats report.
///
/// The name column must equal the stage name exactly, so `ReadStage`
/// never picks up `ReadRepairStage`. The first usable row wins; a row
/// whose counters overflow is skipped.
///
/// # Arguments
/// * `report` — Raw tpstats output
/// * `stage`  — Stage to look up
pub fn parse(report: &str, stage: Stage) -> Option<ThreadPoolRow> {
    let name = stage.as_str();
    scan(report, |row_name, cols| {
        if row_name == name {
            build_row(stage, cols)
        } else {
            None
        }
    })
}

/// Every known stage row in the pool table, in report order.
/// Pools outside the allow-list are skipped.
pub fn parse_all(report: &str) -> Vec<ThreadPoolRow> {
    let mut rows = Vec::new();
    scan(report, |row_name, cols| {
        if let Some(row) = row_name
            .parse::<Stage>()
            .ok()
            .and_then(|stage| build_row(stage, cols))
        {
            rows.push(row);
        }
        None::<()>
    });
    rows
}
