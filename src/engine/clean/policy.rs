use serde::{Deserialize, Serialize};

use crate::engine::errors::CleanError;
use crate::engine::timeline::{Instant, Timeline};
use crate::shared::config::model::CleanerConfig;
use crate::shared::time::instant_epoch_seconds;

/// Rule determining which historical file versions must survive cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionPolicy {
    /// Keep every file version written by the N most recent commits.
    KeepLatestCommits { retain: usize },
    /// Keep the N most recent versions of every file group.
    KeepLatestFileVersions { retain: usize },
    /// Keep everything written within the last H hours of the latest commit.
    KeepLatestByHours { hours: u64 },
}

impl RetentionPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            RetentionPolicy::KeepLatestCommits { .. } => "KEEP_LATEST_COMMITS",
            RetentionPolicy::KeepLatestFileVersions { .. } => "KEEP_LATEST_FILE_VERSIONS",
            RetentionPolicy::KeepLatestByHours { .. } => "KEEP_LATEST_BY_HOURS",
        }
    }

    /// Validate the loaded cleaner configuration. Fails before any plan is
    /// made, let alone any deletion.
    pub fn from_config(cfg: &CleanerConfig) -> Result<Self, CleanError> {
        match cfg.policy.as_str() {
            "KEEP_LATEST_COMMITS" => {
                let retain = require(cfg.commits_retained, "commits_retained")?;
                Ok(RetentionPolicy::KeepLatestCommits { retain })
            }
            "KEEP_LATEST_FILE_VERSIONS" => {
                let retain = require(cfg.file_versions_retained, "file_versions_retained")?;
                Ok(RetentionPolicy::KeepLatestFileVersions { retain })
            }
            "KEEP_LATEST_BY_HOURS" => {
                let hours = require(cfg.hours_retained, "hours_retained")?;
                Ok(RetentionPolicy::KeepLatestByHours { hours })
            }
            other => Err(CleanError::Policy(format!("unknown policy '{other}'"))),
        }
    }
}

fn require<T: PartialEq + Default + Copy>(
    value: Option<T>,
    key: &str,
) -> Result<T, CleanError> {
    match value {
        Some(v) if v != T::default() => Ok(v),
        Some(_) => Err(CleanError::Policy(format!("{key} must be greater than zero"))),
        None => Err(CleanError::Policy(format!("{key} is required"))),
    }
}

/// The earliest commit time that must be retained, or `None` when the policy
/// has no global boundary (per-group evaluation, or nothing committed yet).
pub fn earliest_retained_commit(
    timeline: &Timeline,
    policy: &RetentionPolicy,
) -> Result<Option<String>, CleanError> {
    let writes: Vec<&Instant> = timeline.completed_writes().collect();
    match policy {
        RetentionPolicy::KeepLatestCommits { retain } => {
            let Some(oldest) = writes.first() else {
                return Ok(None);
            };
            let idx = writes.len().saturating_sub(*retain);
            let boundary = writes.get(idx).unwrap_or(oldest);
            Ok(Some(boundary.timestamp.clone()))
        }
        // Evaluated per file group by the planner; no global boundary.
        RetentionPolicy::KeepLatestFileVersions { .. } => Ok(None),
        RetentionPolicy::KeepLatestByHours { hours } => {
            let Some(latest) = writes.last() else {
                return Ok(None);
            };
            let latest_secs = parse_secs(&latest.timestamp)?;
            let cutoff = latest_secs - (*hours as i64) * 3600;
            for write in &writes {
                if parse_secs(&write.timestamp)? >= cutoff {
                    return Ok(Some(write.timestamp.clone()));
                }
            }
            Ok(Some(latest.timestamp.clone()))
        }
    }
}

fn parse_secs(timestamp: &str) -> Result<i64, CleanError> {
    instant_epoch_seconds(timestamp).ok_or_else(|| {
        CleanError::Policy(format!(
            "hour-based retention needs numeric commit times, got '{timestamp}'"
        ))
    })
}
