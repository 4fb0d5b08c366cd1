use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::clean::policy::RetentionPolicy;

/// The concrete deletion plan for one clean instant: per partition, the
/// root-relative file paths marked for deletion, plus the policy and the
/// retention boundary that produced them.
///
/// Persisted as the requested artifact's payload and immutable once the
/// instant moves to inflight; recovery re-reads exactly this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanPlan {
    pub policy: RetentionPolicy,
    pub earliest_retained: Option<String>,
    /// Partitions with nothing eligible keep an empty entry so reporting
    /// still enumerates them.
    pub partitions: BTreeMap<String, Vec<String>>,
}

impl CleanPlan {
    pub fn total_files(&self) -> usize {
        self.partitions.values().map(|files| files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(|files| files.is_empty())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
