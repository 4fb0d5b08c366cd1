use tracing::debug;

use crate::engine::clean::metadata::CleanMetadata;
use crate::engine::errors::CleanError;
use crate::engine::table::TableContext;
use crate::engine::timeline::{Instant, InstantAction};

/// One row of the "list cleans" surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRow {
    pub clean_time: String,
    pub earliest_retained: String,
    pub total_deleted: u64,
    pub time_taken_ms: u64,
}

/// One row of the "show partitions for a clean" surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPartitionRow {
    pub partition: String,
    pub policy: String,
    pub deleted: u64,
    pub failed: u64,
}

/// Completed cleans in reverse chronological order, one row each.
pub fn list_cleans(ctx: &TableContext) -> Result<Vec<CleanRow>, CleanError> {
    let timeline = ctx.timeline();
    let mut rows = Vec::new();
    for instant in timeline
        .reverse_ordered()
        .filter(|i| i.action == InstantAction::Clean && i.is_completed())
    {
        let metadata = read_metadata(ctx, instant)?;
        rows.push(CleanRow {
            clean_time: instant.timestamp.clone(),
            earliest_retained: metadata.earliest_retained.unwrap_or_default(),
            total_deleted: metadata.total_deleted,
            time_taken_ms: metadata.time_taken_ms,
        });
    }
    debug!(target: "cleans::list", rows = rows.len(), "Listed completed cleans");
    Ok(rows)
}

/// Per-partition breakdown of one completed clean.
pub fn clean_partitions(
    ctx: &TableContext,
    clean_time: &str,
) -> Result<Vec<CleanPartitionRow>, CleanError> {
    let timeline = ctx.timeline();
    let instant = timeline
        .find(clean_time, InstantAction::Clean)
        .filter(|i| i.is_completed())
        .ok_or_else(|| CleanError::NotFound(clean_time.to_string()))?;

    let metadata = read_metadata(ctx, instant)?;
    let rows = metadata
        .partitions
        .into_iter()
        .map(|(partition, stats)| CleanPartitionRow {
            partition,
            policy: stats.policy,
            deleted: stats.deleted,
            failed: stats.failed,
        })
        .collect();
    Ok(rows)
}

fn read_metadata(ctx: &TableContext, instant: &Instant) -> Result<CleanMetadata, CleanError> {
    let payload = ctx.timeline().payload(instant)?;
    Ok(CleanMetadata::from_json(&payload)?)
}
