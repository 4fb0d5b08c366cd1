/// One physical version of a logical data file, tagged with the commit that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSlice {
    pub file_id: String,
    pub commit_ts: String,
    /// Path relative to the table root.
    pub path: String,
}

/// The ordered version history of one logical data file within a partition,
/// identified by (partition path, file id).
#[derive(Debug, Clone)]
pub struct FileGroup {
    pub partition: String,
    pub file_id: String,
    slices: Vec<FileSlice>,
}

impl FileGroup {
    pub fn new(partition: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            file_id: file_id.into(),
            slices: Vec::new(),
        }
    }

    pub fn push_slice(&mut self, slice: FileSlice) {
        self.slices.push(slice);
    }

    /// Sort ascending by commit time; path disambiguates for determinism.
    pub fn finish(&mut self) {
        self.slices
            .sort_by(|a, b| (a.commit_ts.as_str(), a.path.as_str()).cmp(&(b.commit_ts.as_str(), b.path.as_str())));
    }

    /// Slices ascending by commit time.
    pub fn slices(&self) -> &[FileSlice] {
        &self.slices
    }

    /// The current slice. Never eligible for deletion.
    pub fn latest_slice(&self) -> Option<&FileSlice> {
        self.slices.last()
    }

    /// Every slice except the latest, ascending.
    pub fn stale_slices(&self) -> &[FileSlice] {
        match self.slices.len() {
            0 => &[],
            n => &self.slices[..n - 1],
        }
    }
}
