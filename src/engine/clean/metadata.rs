use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-partition outcome of a clean run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionCleanStats {
    /// Policy name the plan was derived under.
    pub policy: String,
    /// Files successfully deleted.
    pub deleted: u64,
    /// Per-file failures; recorded, never fatal.
    pub failed: u64,
}

/// The durable, auditable record of what a clean run actually did. Written
/// exactly once, as the completed artifact's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanMetadata {
    pub earliest_retained: Option<String>,
    pub total_deleted: u64,
    pub total_failed: u64,
    pub time_taken_ms: u64,
    /// Every partition the plan enumerated, including empty ones.
    pub partitions: BTreeMap<String, PartitionCleanStats>,
}

impl CleanMetadata {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
