use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::clean::metadata::{CleanMetadata, PartitionCleanStats};
use crate::engine::clean::plan::CleanPlan;
use crate::engine::errors::CleanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeleteOutcome {
    Deleted,
    /// Idempotent retry: the target was gone already. Not a failure, and not
    /// counted as a deletion either.
    AlreadyAbsent,
    Failed,
}

/// Carries out a [`CleanPlan`]: deletes each planned file independently
/// through a bounded worker pool and merges per-item results after join.
///
/// A single file's failure is a counter, never an abort. Only a table root
/// that has vanished outright is fatal.
pub struct CleanExecutor {
    root: PathBuf,
    max_concurrency: usize,
}

impl CleanExecutor {
    pub fn new(root: impl Into<PathBuf>, max_concurrency: usize) -> Self {
        Self {
            root: root.into(),
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub async fn execute(&self, plan: &CleanPlan) -> Result<CleanMetadata, CleanError> {
        let started = std::time::Instant::now();
        self.check_reachable()?;

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles: Vec<JoinHandle<(String, DeleteOutcome)>> = Vec::new();

        for (partition, files) in &plan.partitions {
            for file in files {
                let semaphore = Arc::clone(&semaphore);
                let path = self.root.join(file);
                let partition = partition.clone();
                handles.push(tokio::spawn(async move {
                    // A closed semaphore counts as a per-file failure, the
                    // run itself never panics.
                    match semaphore.acquire_owned().await {
                        Ok(_permit) => (partition, delete_one(&path).await),
                        Err(_) => (partition, DeleteOutcome::Failed),
                    }
                }));
            }
        }

        let mut stats: BTreeMap<String, PartitionCleanStats> = plan
            .partitions
            .keys()
            .map(|partition| {
                (
                    partition.clone(),
                    PartitionCleanStats {
                        policy: plan.policy.name().to_string(),
                        deleted: 0,
                        failed: 0,
                    },
                )
            })
            .collect();

        for handle in handles {
            let (partition, outcome) = handle
                .await
                .map_err(|e| CleanError::Io(std::io::Error::other(e)))?;
            if let Some(entry) = stats.get_mut(&partition) {
                match outcome {
                    DeleteOutcome::Deleted => entry.deleted += 1,
                    DeleteOutcome::AlreadyAbsent => {}
                    DeleteOutcome::Failed => entry.failed += 1,
                }
            }
        }

        // Per-file failures with the root itself gone mean the storage went
        // away, not that individual files did.
        self.check_reachable()?;

        let total_deleted = stats.values().map(|s| s.deleted).sum();
        let total_failed = stats.values().map(|s| s.failed).sum();
        let time_taken_ms = started.elapsed().as_millis() as u64;

        info!(
            target: "clean_executor::execute",
            root = %self.root.display(),
            planned = plan.total_files(),
            total_deleted,
            total_failed,
            time_taken_ms,
            "Clean execution finished"
        );

        Ok(CleanMetadata {
            earliest_retained: plan.earliest_retained.clone(),
            total_deleted,
            total_failed,
            time_taken_ms,
            partitions: stats,
        })
    }

    fn check_reachable(&self) -> Result<(), CleanError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(CleanError::StorageUnreachable(
                self.root.display().to_string(),
            ))
        }
    }
}

async fn delete_one(path: &PathBuf) -> DeleteOutcome {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(target: "clean_executor::delete", path = %path.display(), "Deleted file");
            DeleteOutcome::Deleted
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(target: "clean_executor::delete", path = %path.display(), "File already absent");
            DeleteOutcome::AlreadyAbsent
        }
        Err(e) => {
            warn!(
                target: "clean_executor::delete",
                path = %path.display(),
                error = %e,
                "Failed to delete file"
            );
            DeleteOutcome::Failed
        }
    }
}
