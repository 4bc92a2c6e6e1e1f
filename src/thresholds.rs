/*!
 * thresholds.rs — Configurable alert thresholds for check-tpstats
 *
 * Thresholds come from three layers, later ones winning: built-in
 * defaults, an optional TOML file, then explicit command line flags.
 * A negative value disables that threshold.
 *
 * License: GPLv3+
 */

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CheckError;

/// Sentinel used on the command line and in config files for "off".
pub const DISABLED: i64 = -1;

/// A single threshold. Negative means disabled and never triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Threshold(Option<u64>);

impl Threshold {
    pub const fn disabled() -> Self {
        Threshold(None)
    }

    pub const fn at(limit: u64) -> Self {
        Threshold(Some(limit))
    }

    pub fn limit(self) -> Option<u64> {
        self.0
    }

    pub fn is_enabled(self) -> bool {
        self.0.is_some()
    }

    /// `value >= limit`, used for pending.
    pub fn reached_by(self, value: u64) -> bool {
        self.0.is_some_and(|limit| value >= limit)
    }

    /// `value > limit`, used for blocked.
    pub fn exceeded_by(self, value: u64) -> bool {
        self.0.is_some_and(|limit| value > limit)
    }
}

impl From<i64> for Threshold {
    fn from(raw: i64) -> Self {
        Threshold(u64::try_from(raw).ok())
    }
}

impl From<Threshold> for i64 {
    fn from(t: Threshold) -> Self {
        t.0.and_then(|limit| i64::try_from(limit).ok()).unwrap_or(DISABLED)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(limit) => write!(f, "{}", limit),
            None => f.write_str("disabled"),
        }
    }
}

/// All thresholds for one check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    pub warning_pending: Threshold,
    pub critical_pending: Threshold,
    pub warning_blocked: Threshold,
    pub critical_blocked: Threshold,
}

/// Defaults: critical at 15 pending or any blocked task, no warnings.
impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            warning_pending: Threshold::disabled(),
            critical_pending: Threshold::at(15),
            warning_blocked: Threshold::disabled(),
            critical_blocked: Threshold::at(0),
        }
    }
}

/// Per-flag overrides; `None` leaves the underlying value alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdOverrides {
    pub warning_pending: Option<i64>,
    pub critical_pending: Option<i64>,
    pub warning_blocked: Option<i64>,
    pub critical_blocked: Option<i64>,
}

impl ThresholdConfig {
    /// Apply command line overrides on top of this config.
    pub fn with_overrides(mut self, o: ThresholdOverrides) -> Self {
        if let Some(v) = o.warning_pending {
            self.warning_pending = v.into();
        }
        if let Some(v) = o.critical_pending {
            self.critical_pending = v.into();
        }
        if let Some(v) = o.warning_blocked {
            self.warning_blocked = v.into();
        }
        if let Some(v) = o.critical_blocked {
            self.critical_blocked = v.into();
        }
        self
    }
}

/// Parse thresholds from TOML text. Missing keys keep their defaults.
///
/// Example TOML:
/// ```toml
/// warning_pending = 10
/// critical_pending = 15
/// warning_blocked = -1
/// critical_blocked = 0
/// ```
pub fn parse_thresholds(data: &str) -> Result<ThresholdConfig, toml::de::Error> {
    toml::from_str(data)
}

/// Load thresholds from a TOML config file.
///
/// Unlike the built-in defaults, a named file must exist and parse:
/// a broken config is reported rather than silently ignored.
pub fn load_thresholds_from_file(path: &Path) -> Result<ThresholdConfig, CheckError> {
    let data = fs::read_to_string(path).map_err(|source| CheckError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_thresholds(&data).map_err(|source| CheckError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn negative_values_disable() {
        assert_eq!(Threshold::from(-1), Threshold::disabled());
        assert_eq!(Threshold::from(-42), Threshold::disabled());
        assert_eq!(Threshold::from(0), Threshold::at(0));
        assert!(!Threshold::disabled().reached_by(u64::MAX));
        assert!(!Threshold::disabled().exceeded_by(u64::MAX));
    }

    #[test]
    fn comparisons_differ_at_the_boundary() {
        let t = Threshold::at(15);
        assert!(t.reached_by(15));
        assert!(!t.exceeded_by(15));
        assert!(t.exceeded_by(16));
        assert!(!t.reached_by(14));
    }

    #[test]
    fn defaults_match_the_cli() {
        let d = ThresholdConfig::default();
        assert!(!d.warning_pending.is_enabled());
        assert_eq!(d.critical_pending.limit(), Some(15));
        assert!(!d.warning_blocked.is_enabled());
        assert_eq!(d.critical_blocked.limit(), Some(0));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let t = parse_thresholds("warning_pending = 10\ncritical_blocked = -1\n").unwrap();
        assert_eq!(t.warning_pending, Threshold::at(10));
        assert_eq!(t.critical_pending, Threshold::at(15));
        assert_eq!(t.critical_blocked, Threshold::disabled());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_thresholds("warn_pending = 10\n").is_err());
        assert!(parse_thresholds("warning_pending = \"ten\"\n").is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let base = parse_thresholds("critical_pending = 40\nwarning_pending = 20\n").unwrap();
        let merged = base.with_overrides(ThresholdOverrides {
            critical_pending: Some(50),
            warning_blocked: Some(3),
            ..Default::default()
        });
        assert_eq!(merged.critical_pending, Threshold::at(50));
        assert_eq!(merged.warning_pending, Threshold::at(20));
        assert_eq!(merged.warning_blocked, Threshold::at(3));
        assert_eq!(merged.critical_blocked, Threshold::at(0));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# tuned for a busy cluster").unwrap();
        writeln!(file, "critical_pending = 100").unwrap();
        let t = load_thresholds_from_file(file.path()).unwrap();
        assert_eq!(t.critical_pending, Threshold::at(100));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_thresholds_from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, CheckError::ConfigRead { .. }));
    }

    #[test]
    fn disabled_serializes_as_sentinel() {
        let text = toml::to_string(&ThresholdConfig::default()).unwrap();
        assert!(text.contains("warning_pending = -1"));
        assert!(text.contains("critical_pending = 15"));
    }
}
