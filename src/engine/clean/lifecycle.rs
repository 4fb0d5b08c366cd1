use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::engine::clean::metadata::CleanMetadata;
use crate::engine::clean::plan::CleanPlan;
use crate::engine::errors::CleanError;
use crate::engine::timeline::{Instant, InstantAction, InstantState, TIMELINE_DIR, Timeline};

/// Drives a clean instant through requested -> inflight -> completed.
///
/// This is the sole mutation point of the on-disk marker set. The requested
/// marker doubles as the table-wide clean lease: holding it (or the inflight
/// marker) blocks every other clean request until the run completes or is
/// resumed.
pub struct CleanLifecycle {
    timeline_dir: PathBuf,
}

impl CleanLifecycle {
    pub fn new(table_root: &Path) -> Self {
        Self {
            timeline_dir: table_root.join(TIMELINE_DIR),
        }
    }

    /// Acquire the lease and persist the plan as the requested artifact.
    ///
    /// Rejected while any clean is requested or inflight in the snapshot;
    /// the `create_new` reservation catches racing processes the snapshot
    /// missed.
    pub fn begin(&self, timeline: &Timeline, plan: &CleanPlan) -> Result<Instant, CleanError> {
        if let Some(pending) = timeline.pending_clean() {
            return Err(CleanError::AlreadyInProgress(pending.timestamp.clone()));
        }

        let instant = Instant::new(
            InstantAction::Clean,
            InstantState::Requested,
            timeline.next_timestamp(),
        );
        let name = instant.marker_name();
        let path = self.timeline_dir.join(&name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CleanError::AlreadyInProgress(instant.timestamp));
            }
            Err(e) => return Err(CleanError::Io(e)),
        }
        self.publish(&name, &plan.to_json()?)?;

        info!(
            target: "clean_lifecycle::begin",
            instant = %instant,
            planned_files = plan.total_files(),
            "Clean requested"
        );
        Ok(instant)
    }

    /// Requested -> inflight: drop the crash-recoverable resume marker.
    pub fn mark_inflight(&self, instant: Instant) -> Result<Instant, CleanError> {
        let inflight = instant.into_inflight()?;
        fs::File::create(self.timeline_dir.join(inflight.marker_name()))?;
        info!(target: "clean_lifecycle::mark_inflight", instant = %inflight, "Clean inflight");
        Ok(inflight)
    }

    /// Inflight -> completed: publish the metadata atomically. Readers see
    /// either no completed marker or the fully written payload, never a
    /// partial write.
    pub fn complete(
        &self,
        instant: Instant,
        metadata: &CleanMetadata,
    ) -> Result<Instant, CleanError> {
        let completed = instant.into_completed()?;
        self.publish(&completed.marker_name(), &metadata.to_json()?)?;

        info!(
            target: "clean_lifecycle::complete",
            instant = %completed,
            total_deleted = metadata.total_deleted,
            total_failed = metadata.total_failed,
            "Clean completed"
        );
        Ok(completed)
    }

    /// Overwrite a requested instant's plan payload. Used when a crash left
    /// the reservation on disk without a readable plan behind it.
    pub fn republish_plan(&self, instant: &Instant, plan: &CleanPlan) -> Result<(), CleanError> {
        if instant.state != InstantState::Requested {
            return Err(CleanError::IllegalTransition {
                from: instant.marker_name(),
                to: InstantState::Requested.as_str().to_string(),
            });
        }
        self.publish(&instant.marker_name(), &plan.to_json()?)?;
        info!(
            target: "clean_lifecycle::republish_plan",
            instant = %instant,
            planned_files = plan.total_files(),
            "Replanned abandoned clean reservation"
        );
        Ok(())
    }

    /// Payload of this clean's requested artifact, for resuming.
    pub fn requested_plan(&self, timestamp: &str) -> Result<CleanPlan, CleanError> {
        let requested = Instant::new(InstantAction::Clean, InstantState::Requested, timestamp);
        let path = self.timeline_dir.join(requested.marker_name());
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CleanError::NotFound(requested.marker_name())
            } else {
                CleanError::Io(e)
            }
        })?;
        Ok(CleanPlan::from_json(&bytes)?)
    }

    // Write to a sibling tmp file, sync, rename onto the marker.
    fn publish(&self, marker_name: &str, payload: &[u8]) -> Result<(), CleanError> {
        let path = self.timeline_dir.join(marker_name);
        let tmp_path = self.timeline_dir.join(format!("{marker_name}.tmp"));
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(payload)?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
