use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::clean::plan::CleanPlan;
use crate::engine::clean::policy::RetentionPolicy;
use crate::engine::inventory::{FileGroup, Inventory};

/// Combine the inventory and the retention boundary into a deletion plan.
///
/// Pure: produces a value, performs no I/O. A file group's latest slice is
/// never marked, under any policy.
pub fn plan(
    inventory: &Inventory,
    earliest_retained: Option<&str>,
    policy: &RetentionPolicy,
) -> CleanPlan {
    let mut partitions = BTreeMap::new();

    for (partition, groups) in inventory {
        let mut files: Vec<String> = groups
            .iter()
            .flat_map(|group| eligible_files(group, earliest_retained, policy))
            .collect();
        files.sort();
        debug!(
            target: "planner::plan",
            partition = %partition,
            eligible = files.len(),
            "Planned partition"
        );
        partitions.insert(partition.clone(), files);
    }

    CleanPlan {
        policy: policy.clone(),
        earliest_retained: earliest_retained.map(str::to_string),
        partitions,
    }
}

fn eligible_files(
    group: &FileGroup,
    earliest_retained: Option<&str>,
    policy: &RetentionPolicy,
) -> Vec<String> {
    match policy {
        RetentionPolicy::KeepLatestFileVersions { retain } => {
            // All but the N newest slices; retain >= 1 keeps the latest out.
            let keep = (*retain).max(1);
            let cut = group.slices().len().saturating_sub(keep);
            group.slices()[..cut]
                .iter()
                .map(|slice| slice.path.clone())
                .collect()
        }
        RetentionPolicy::KeepLatestCommits { .. } | RetentionPolicy::KeepLatestByHours { .. } => {
            let Some(boundary) = earliest_retained else {
                return Vec::new();
            };
            // Strictly older than the boundary, and never the latest slice.
            group
                .stale_slices()
                .iter()
                .filter(|slice| slice.commit_ts.as_str() < boundary)
                .map(|slice| slice.path.clone())
                .collect()
        }
    }
}
