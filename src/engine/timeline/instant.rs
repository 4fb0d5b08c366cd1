use std::fmt::{Display, Formatter};

use crate::engine::errors::CleanError;

/// Operation kind recorded on the timeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InstantAction {
    Commit,
    Compaction,
    Clean,
}

impl InstantAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstantAction::Commit => "commit",
            InstantAction::Compaction => "compaction",
            InstantAction::Clean => "clean",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "commit" => Some(InstantAction::Commit),
            "compaction" => Some(InstantAction::Compaction),
            "clean" => Some(InstantAction::Clean),
            _ => None,
        }
    }

    /// Commits and compactions both produce file slices.
    pub fn is_write(&self) -> bool {
        matches!(self, InstantAction::Commit | InstantAction::Compaction)
    }

    /// Tie-break rank for instants sharing a timestamp: writes sort before
    /// cleans. An ordering convention, nothing downstream depends on the
    /// commit/compaction relative order.
    pub fn priority(&self) -> u8 {
        match self {
            InstantAction::Commit => 0,
            InstantAction::Compaction => 1,
            InstantAction::Clean => 2,
        }
    }
}

/// Lifecycle state of an instant. Derived `Ord` ranks Requested < Inflight
/// < Completed, which is what marker collapsing relies on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum InstantState {
    Requested,
    Inflight,
    Completed,
}

impl InstantState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstantState::Requested => "requested",
            InstantState::Inflight => "inflight",
            InstantState::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(InstantState::Requested),
            "inflight" => Some(InstantState::Inflight),
            "completed" => Some(InstantState::Completed),
            _ => None,
        }
    }
}

/// One timestamped operation record. Immutable: state transitions return a
/// new value and refuse to move backward.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instant {
    pub action: InstantAction,
    pub state: InstantState,
    /// Lexicographically sortable logical clock.
    pub timestamp: String,
    /// Load-order sequence within one timeline snapshot; final tie-break key.
    pub seq: u64,
}

impl Instant {
    pub fn new(action: InstantAction, state: InstantState, timestamp: impl Into<String>) -> Self {
        Self {
            action,
            state,
            timestamp: timestamp.into(),
            seq: 0,
        }
    }

    /// On-disk marker file name for this (timestamp, action, state) triple.
    pub fn marker_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.timestamp,
            self.action.as_str(),
            self.state.as_str()
        )
    }

    pub fn is_completed(&self) -> bool {
        self.state == InstantState::Completed
    }

    /// Requested or inflight.
    pub fn is_pending(&self) -> bool {
        self.state != InstantState::Completed
    }

    /// Total deterministic ordering key: timestamp, action priority, load order.
    pub fn sort_key(&self) -> (&str, u8, u64) {
        (&self.timestamp, self.action.priority(), self.seq)
    }

    /// Requested -> Inflight.
    pub fn into_inflight(self) -> Result<Instant, CleanError> {
        if self.state != InstantState::Requested {
            return Err(self.illegal_transition(InstantState::Inflight));
        }
        Ok(Instant {
            state: InstantState::Inflight,
            ..self
        })
    }

    /// Inflight -> Completed.
    pub fn into_completed(self) -> Result<Instant, CleanError> {
        if self.state != InstantState::Inflight {
            return Err(self.illegal_transition(InstantState::Completed));
        }
        Ok(Instant {
            state: InstantState::Completed,
            ..self
        })
    }

    fn illegal_transition(&self, to: InstantState) -> CleanError {
        CleanError::IllegalTransition {
            from: self.marker_name(),
            to: to.as_str().to_string(),
        }
    }
}

impl Display for Instant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.marker_name())
    }
}
