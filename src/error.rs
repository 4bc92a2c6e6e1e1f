/*!
 * error.rs — Failure taxonomy for check-tpstats
 *
 * Every variant ends the run with UNKNOWN: these are problems with the
 * check itself (configuration, fetching, absent data), never an observed
 * metric value.
 *
 * License: GPLv3+
 */

use std::path::PathBuf;

use thiserror::Error;

use crate::stage::Stage;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no stage given, use --stage <NAME>")]
    MissingStage,

    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    #[error("stage {0} not found in tpstats output")]
    StageNotFound(Stage),

    #[error("failed to run {program}: {source}")]
    NodetoolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    NodetoolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} did not finish within {secs}s")]
    NodetoolTimeout { program: String, secs: u64 },

    #[error("could not read output of {program}: {reason}")]
    NodetoolOutput { program: String, reason: String },

    #[error("failed to read report {}: {source}", .path.display())]
    ReportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}
