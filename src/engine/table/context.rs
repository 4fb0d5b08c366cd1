use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::engine::errors::TimelineError;
use crate::engine::timeline::{TIMELINE_DIR, Timeline};

/// Marker file whose presence denotes "this directory is a managed partition".
pub const PARTITION_META_FILE: &str = ".partition_meta";

/// Everything a clean needs to know about one table: the root directory and
/// a consistent timeline snapshot. Passed explicitly into every component
/// call; nothing reads table state ambiently.
#[derive(Debug, Clone)]
pub struct TableContext {
    root: PathBuf,
    timeline: Timeline,
}

impl TableContext {
    pub fn open(root: &Path) -> Result<TableContext, TimelineError> {
        let timeline = Timeline::load(root)?;
        Ok(TableContext {
            root: root.to_path_buf(),
            timeline,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Fresh context over a reloaded snapshot; `self` stays untouched.
    pub fn reloaded(&self) -> Result<TableContext, TimelineError> {
        Ok(TableContext {
            root: self.root.clone(),
            timeline: self.timeline.reload()?,
        })
    }

    /// Relative paths of every marked partition under the root, sorted.
    ///
    /// Directories without a partition metafile are recursed into (nested
    /// partition layouts like `2016/03/15`) but not reported themselves.
    pub fn partitions(&self) -> Result<Vec<String>, TimelineError> {
        let mut found = Vec::new();
        collect_partitions(&self.root, &self.root, &mut found)?;
        found.sort();
        debug!(
            target: "table::partitions",
            root = %self.root.display(),
            count = found.len(),
            "Discovered partitions"
        );
        Ok(found)
    }
}

fn collect_partitions(
    root: &Path,
    dir: &Path,
    found: &mut Vec<String>,
) -> Result<(), TimelineError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name == TIMELINE_DIR {
            continue;
        }
        if path.join(PARTITION_META_FILE).is_file() {
            found.push(relative_path(root, &path));
        } else {
            collect_partitions(root, &path, found)?;
        }
    }
    Ok(())
}

/// Root-relative path with `/` separators, independent of platform.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
