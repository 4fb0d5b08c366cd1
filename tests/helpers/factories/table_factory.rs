use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::engine::table::{PARTITION_META_FILE, TableContext};
use crate::engine::timeline::{TIMELINE_DIR, Timeline};

/// Builds throwaway on-disk tables for tests: a root with a `.timeline`
/// directory, marker files, marked partitions and versioned data files.
/// The backing tempdir lives as long as the factory.
pub struct TableFactory {
    _dir: TempDir,
    root: PathBuf,
}

impl TableFactory {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("table");
        fs::create_dir_all(root.join(TIMELINE_DIR)).unwrap();
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Completed commit marker with an empty JSON payload.
    pub fn commit(&self, timestamp: &str) -> &Self {
        self.marker(timestamp, "commit", "completed", b"{}")
    }

    /// Completed compaction marker with an empty JSON payload.
    pub fn compaction(&self, timestamp: &str) -> &Self {
        self.marker(timestamp, "compaction", "completed", b"{}")
    }

    pub fn marker(&self, timestamp: &str, action: &str, state: &str, payload: &[u8]) -> &Self {
        let name = format!("{timestamp}.{action}.{state}");
        self.raw_marker(&name, payload)
    }

    /// Write an arbitrary file into `.timeline/`, corrupt names included.
    pub fn raw_marker(&self, name: &str, payload: &[u8]) -> &Self {
        let path = self.root.join(TIMELINE_DIR).join(name);
        let mut f = File::create(path).unwrap();
        f.write_all(payload).unwrap();
        self
    }

    /// Create a managed partition (directory plus partition metafile).
    pub fn partition(&self, relative: &str) -> &Self {
        let dir = self.root.join(relative);
        fs::create_dir_all(&dir).unwrap();
        File::create(dir.join(PARTITION_META_FILE)).unwrap();
        self
    }

    /// Directory without a partition metafile; must be skipped by discovery.
    pub fn bare_dir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.root.join(relative)).unwrap();
        self
    }

    /// Versioned data file `{file_id}_{commit_ts}.dat` inside a partition.
    pub fn data_file(&self, partition: &str, file_id: &str, commit_ts: &str) -> PathBuf {
        let dir = self.root.join(partition);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{file_id}_{commit_ts}.dat"));
        let mut f = File::create(&path).unwrap();
        f.write_all(b"data").unwrap();
        path
    }

    pub fn timeline(&self) -> Timeline {
        Timeline::load(&self.root).unwrap()
    }

    pub fn context(&self) -> TableContext {
        TableContext::open(&self.root).unwrap()
    }
}

impl Default for TableFactory {
    fn default() -> Self {
        Self::new()
    }
}
