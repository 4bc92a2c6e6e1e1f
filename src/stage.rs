/*!
 * stage.rs — Known thread pool stage names
 *
 * The closed set of stages a check may target. Anything outside this list
 * is a configuration error and is rejected before nodetool is ever run.
 *
 * License: GPLv3+
 */

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CheckError;

/// A thread pool stage as named in the `Pool Name` column of tpstats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    AntiEntropyStage,
    CacheCleanupExecutor,
    CommitLogArchiver,
    CompactionExecutor,
    CounterMutationStage,
    GossipStage,
    HintedHandoff,
    InternalResponseStage,
    MemtableFlushWriter,
    MemtablePostFlush,
    MemtableReclaimMemory,
    MigrationStage,
    MiscStage,
    MutationStage,
    PendingRangeCalculator,
    ReadRepairStage,
    ReadStage,
    RequestResponseStage,
    ValidationExecutor,
}

impl Stage {
    /// Every known stage, alphabetical.
    pub const ALL: [Stage; 19] = [
        Stage::AntiEntropyStage,
        Stage::CacheCleanupExecutor,
        Stage::CommitLogArchiver,
        Stage::CompactionExecutor,
        Stage::CounterMutationStage,
        Stage::GossipStage,
        Stage::HintedHandoff,
        Stage::InternalResponseStage,
        Stage::MemtableFlushWriter,
        Stage::MemtablePostFlush,
        Stage::MemtableReclaimMemory,
        Stage::MigrationStage,
        Stage::MiscStage,
        Stage::MutationStage,
        Stage::PendingRangeCalculator,
        Stage::ReadRepairStage,
        Stage::ReadStage,
        Stage::RequestResponseStage,
        Stage::ValidationExecutor,
    ];

    /// The exact text nodetool prints for this stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::AntiEntropyStage => "AntiEntropyStage",
            Stage::CacheCleanupExecutor => "CacheCleanupExecutor",
            Stage::CommitLogArchiver => "CommitLogArchiver",
            Stage::CompactionExecutor => "CompactionExecutor",
            Stage::CounterMutationStage => "CounterMutationStage",
            Stage::GossipStage => "GossipStage",
            Stage::HintedHandoff => "HintedHandoff",
            Stage::InternalResponseStage => "InternalResponseStage",
            Stage::MemtableFlushWriter => "MemtableFlushWriter",
            Stage::MemtablePostFlush => "MemtablePostFlush",
            Stage::MemtableReclaimMemory => "MemtableReclaimMemory",
            Stage::MigrationStage => "MigrationStage",
            Stage::MiscStage => "MiscStage",
            Stage::MutationStage => "MutationStage",
            Stage::PendingRangeCalculator => "PendingRangeCalculator",
            Stage::ReadRepairStage => "ReadRepairStage",
            Stage::ReadStage => "ReadStage",
            Stage::RequestResponseStage => "RequestResponseStage",
            Stage::ValidationExecutor => "ValidationExecutor",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CheckError;

    /// Exact, case-sensitive match against the allow-list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| CheckError::UnknownStage(s.to_string()))
    }
}
