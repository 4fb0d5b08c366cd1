use std::collections::BTreeMap;
use std::fs;

use tracing::debug;

use crate::engine::errors::TimelineError;
use crate::engine::inventory::file_group::{FileGroup, FileSlice};
use crate::engine::table::{PARTITION_META_FILE, TableContext};

/// Extension of versioned data files: `{file_id}_{commit_ts}.dat`.
pub const DATA_FILE_EXT: &str = "dat";

/// Per-partition file groups, keyed by partition path.
pub type Inventory = BTreeMap<String, Vec<FileGroup>>;

/// Derive the multi-version file inventory for the given partitions.
///
/// Pure over the context's timeline snapshot and the directory listing: no
/// writes, no deletes. Partitions without a metafile are skipped (a freshly
/// created, never-written partition has none). Files whose embedded commit
/// time is not a completed write in the snapshot are invisible, which is
/// what keeps concurrent writers out of an ongoing clean's plan.
pub fn build_inventory(
    ctx: &TableContext,
    partitions: &[String],
) -> Result<Inventory, TimelineError> {
    let mut inventory = Inventory::new();

    for partition in partitions {
        let dir = ctx.root().join(partition);
        if !dir.join(PARTITION_META_FILE).is_file() {
            debug!(
                target: "inventory::build",
                partition = %partition,
                "Skipping unmarked partition"
            );
            continue;
        }

        let mut groups: BTreeMap<String, FileGroup> = BTreeMap::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let Some((file_id, commit_ts)) = parse_data_file(&name) else {
                continue;
            };
            if !ctx.timeline().is_committed(commit_ts) {
                debug!(
                    target: "inventory::build",
                    partition = %partition,
                    file = %name,
                    commit_ts,
                    "Ignoring file from uncommitted instant"
                );
                continue;
            }
            groups
                .entry(file_id.to_string())
                .or_insert_with(|| FileGroup::new(partition.clone(), file_id))
                .push_slice(FileSlice {
                    file_id: file_id.to_string(),
                    commit_ts: commit_ts.to_string(),
                    path: format!("{partition}/{name}"),
                });
        }

        let mut file_groups: Vec<FileGroup> = groups.into_values().collect();
        for group in &mut file_groups {
            group.finish();
        }
        debug!(
            target: "inventory::build",
            partition = %partition,
            groups = file_groups.len(),
            "Built partition inventory"
        );
        inventory.insert(partition.clone(), file_groups);
    }

    Ok(inventory)
}

/// Split `{file_id}_{commit_ts}.dat`; anything else is not a managed file.
fn parse_data_file(name: &str) -> Option<(&str, &str)> {
    let stem = name.strip_suffix(&format!(".{DATA_FILE_EXT}"))?;
    let (file_id, commit_ts) = stem.rsplit_once('_')?;
    if file_id.is_empty() || commit_ts.is_empty() {
        return None;
    }
    Some((file_id, commit_ts))
}
