use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::engine::errors::TimelineError;
use crate::engine::timeline::instant::{Instant, InstantAction, InstantState};
use crate::shared::time::wallclock_instant;

/// Directory under the table root holding one marker file per
/// (timestamp, action, state) triple.
pub const TIMELINE_DIR: &str = ".timeline";

/// Immutable point-in-time snapshot of a table's instant markers.
///
/// Staleness is resolved by an explicit [`Timeline::reload`], never
/// implicitly. Markers for the same (timestamp, action) collapse to the
/// highest state reached, so a completed clean whose requested/inflight
/// artifacts are still on disk shows up once, as completed.
#[derive(Debug, Clone)]
pub struct Timeline {
    table_root: PathBuf,
    instants: Vec<Instant>,
}

impl Timeline {
    pub fn load(table_root: &Path) -> Result<Timeline, TimelineError> {
        if !table_root.is_dir() {
            return Err(TimelineError::TableNotFound(table_root.to_path_buf()));
        }
        let dir = table_root.join(TIMELINE_DIR);
        if !dir.is_dir() {
            return Err(TimelineError::TableNotFound(dir));
        }

        let mut collapsed: BTreeMap<(String, u8), (InstantAction, InstantState)> = BTreeMap::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            // Crash leftovers from atomic tmp-then-rename writes, and dotfiles.
            if name.starts_with('.') || name.ends_with(".tmp") {
                continue;
            }
            let (timestamp, action, state) = parse_marker(&name)?;
            let key = (timestamp, action.priority());
            match collapsed.get_mut(&key) {
                Some(existing) if existing.1 >= state => {}
                Some(existing) => *existing = (action, state),
                None => {
                    collapsed.insert(key, (action, state));
                }
            }
        }

        let mut instants: Vec<Instant> = collapsed
            .into_iter()
            .map(|((timestamp, _), (action, state))| Instant::new(action, state, timestamp))
            .collect();
        instants.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        for (seq, instant) in instants.iter_mut().enumerate() {
            instant.seq = seq as u64;
        }

        debug!(
            target: "timeline::load",
            table_root = %table_root.display(),
            instants = instants.len(),
            "Loaded timeline snapshot"
        );

        Ok(Timeline {
            table_root: table_root.to_path_buf(),
            instants,
        })
    }

    /// Re-read the persisted markers into a fresh snapshot.
    pub fn reload(&self) -> Result<Timeline, TimelineError> {
        Timeline::load(&self.table_root)
    }

    pub fn table_root(&self) -> &Path {
        &self.table_root
    }

    pub fn timeline_dir(&self) -> PathBuf {
        self.table_root.join(TIMELINE_DIR)
    }

    /// All instants in ascending deterministic order.
    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    pub fn filter<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Instant>
    where
        P: Fn(&Instant) -> bool + 'a,
    {
        self.instants.iter().filter(move |i| predicate(i))
    }

    pub fn reverse_ordered(&self) -> impl Iterator<Item = &Instant> {
        self.instants.iter().rev()
    }

    /// Completed commit/compaction instants, ascending.
    pub fn completed_writes(&self) -> impl Iterator<Item = &Instant> {
        self.filter(|i| i.action.is_write() && i.is_completed())
    }

    pub fn completed_cleans(&self) -> impl Iterator<Item = &Instant> {
        self.filter(|i| i.action == InstantAction::Clean && i.is_completed())
    }

    /// The clean currently holding the lease, if any: requested or inflight.
    pub fn pending_clean(&self) -> Option<&Instant> {
        self.instants
            .iter()
            .find(|i| i.action == InstantAction::Clean && i.is_pending())
    }

    pub fn latest_completed_write(&self) -> Option<&Instant> {
        self.completed_writes().last()
    }

    pub fn find(&self, timestamp: &str, action: InstantAction) -> Option<&Instant> {
        self.instants
            .iter()
            .find(|i| i.timestamp == timestamp && i.action == action)
    }

    /// Whether `timestamp` names a completed write visible in this snapshot.
    pub fn is_committed(&self, timestamp: &str) -> bool {
        self.completed_writes().any(|i| i.timestamp == timestamp)
    }

    pub fn marker_path(&self, instant: &Instant) -> PathBuf {
        self.timeline_dir().join(instant.marker_name())
    }

    /// Raw payload bytes of an instant's marker artifact.
    pub fn payload(&self, instant: &Instant) -> Result<Vec<u8>, TimelineError> {
        Ok(fs::read(self.marker_path(instant))?)
    }

    /// Next timestamp, strictly greater than every instant in this snapshot.
    ///
    /// Numeric timestamps get a width-preserving numeric successor so test
    /// timelines like 100..103 stay lexicographically ordered; otherwise the
    /// wall clock is used.
    pub fn next_timestamp(&self) -> String {
        let Some(last) = self.instants.last() else {
            return wallclock_instant();
        };
        let ts = &last.timestamp;
        if ts.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = ts.parse::<u128>() {
                let successor = format!("{:0width$}", n + 1, width = ts.len());
                // A successor that gained a digit ("999" -> "1000") no longer
                // compares greater as a string; fall through to the extend path.
                if successor.len() == ts.len() {
                    return successor;
                }
            }
        }
        let candidate = wallclock_instant();
        if candidate > *ts {
            candidate
        } else {
            // Timestamp newer than the wall clock; extend it.
            format!("{}0", ts)
        }
    }
}

/// Parse `timestamp.action.state`. Anything unrecognized is corruption.
fn parse_marker(name: &str) -> Result<(String, InstantAction, InstantState), TimelineError> {
    let mut parts = name.split('.');
    let (Some(timestamp), Some(action), Some(state), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TimelineError::Corrupt(name.to_string()));
    };
    if timestamp.is_empty() {
        return Err(TimelineError::Corrupt(name.to_string()));
    }
    let action =
        InstantAction::parse(action).ok_or_else(|| TimelineError::Corrupt(name.to_string()))?;
    let state =
        InstantState::parse(state).ok_or_else(|| TimelineError::Corrupt(name.to_string()))?;
    Ok((timestamp.to_string(), action, state))
}
