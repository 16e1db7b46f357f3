use std::{fmt, time::Duration};

use serde::Serialize;

/// Why a unit was copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncReason {
    Forced,
    DevMode,
    Changed,
    Uncached,
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forced => write!(f, "forced"),
            Self::DevMode => write!(f, "dev mode"),
            Self::Changed => write!(f, "changed"),
            Self::Uncached => write!(f, "not cached"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum UnitStatus {
    /// Digest matched the cache; nothing copied.
    Cached,
    Synced {
        reason: SyncReason,
        files: usize,
        failed_files: usize,
    },
    /// The target could not be prepared; nothing copied.
    Failed { error: String },
}

/// Outcome for one unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    /// Cache key: `_core` for flat sources, the node directory otherwise.
    pub key: String,
    /// Label of the source it came from.
    pub source: String,
    pub status: UnitStatus,
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub units: Vec<UnitReport>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn synced(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.status, UnitStatus::Synced { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.status == UnitStatus::Cached)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.status, UnitStatus::Failed { .. }))
            .count()
    }

    /// Files copied across all units.
    pub fn files(&self) -> usize {
        self.units
            .iter()
            .map(|u| match u.status {
                UnitStatus::Synced { files, .. } => files,
                _ => 0,
            })
            .sum()
    }

    pub fn failed_files(&self) -> usize {
        self.units
            .iter()
            .map(|u| match u.status {
                UnitStatus::Synced { failed_files, .. } => failed_files,
                _ => 0,
            })
            .sum()
    }

    /// Nothing needed copying.
    /// No unit copied and none failed.
    pub fn all_cached(&self) -> bool {
        self.synced() == 0 && self.failed() == 0
    }

    pub fn skipped_keys(&self) -> Vec<&str> {
        self.units
            .iter()
            .filter(|u| u.status == UnitStatus::Cached)
            .map(|u| u.key.as_str())
            .collect()
    }
}

mod duration_secs {
    use {serde::Serializer, std::time::Duration};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(key: &str, status: UnitStatus) -> UnitReport {
        UnitReport {
            key: key.into(),
            source: "nodes".into(),
            status,
        }
    }

    #[test]
    fn counts() {
        let report = SyncReport {
            units: vec![
                unit("_core", UnitStatus::Cached),
                unit(
                    "a",
                    UnitStatus::Synced {
                        reason: SyncReason::Changed,
                        files: 3,
                        failed_files: 1,
                    },
                ),
                unit(
                    "b",
                    UnitStatus::Failed {
                        error: "denied".into(),
                    },
                ),
            ],
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(report.synced(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.files(), 3);
        assert_eq!(report.failed_files(), 1);
        assert!(!report.all_cached());
        assert_eq!(report.skipped_keys(), ["_core"]);
    }

    #[test]
    fn empty_report_is_all_cached() {
        assert!(SyncReport::default().all_cached());
    }

    #[test]
    fn all_failed_is_not_all_cached() {
        let report = SyncReport {
            units: vec![unit(
                "a",
                UnitStatus::Failed {
                    error: "denied".into(),
                },
            )],
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.synced(), 0);
        assert!(!report.all_cached());
    }
}
