use crate::engine::errors::CleanError;
use crate::engine::timeline::{Instant, InstantAction, InstantState};

#[test]
fn marker_names_round_trip_the_triple() {
    let instant = Instant::new(InstantAction::Clean, InstantState::Requested, "00100");
    assert_eq!(instant.marker_name(), "00100.clean.requested");

    assert_eq!(InstantAction::parse("commit"), Some(InstantAction::Commit));
    assert_eq!(InstantAction::parse("compaction"), Some(InstantAction::Compaction));
    assert_eq!(InstantAction::parse("clean"), Some(InstantAction::Clean));
    assert_eq!(InstantAction::parse("delta"), None);

    assert_eq!(InstantState::parse("requested"), Some(InstantState::Requested));
    assert_eq!(InstantState::parse("inflight"), Some(InstantState::Inflight));
    assert_eq!(InstantState::parse("completed"), Some(InstantState::Completed));
    assert_eq!(InstantState::parse("done"), None);
}

#[test]
fn writes_sort_before_cleans_at_equal_timestamps() {
    let commit = Instant::new(InstantAction::Commit, InstantState::Completed, "100");
    let compaction = Instant::new(InstantAction::Compaction, InstantState::Completed, "100");
    let clean = Instant::new(InstantAction::Clean, InstantState::Completed, "100");

    assert!(commit.sort_key() < compaction.sort_key());
    assert!(compaction.sort_key() < clean.sort_key());
}

#[test]
fn transitions_only_move_forward() {
    let requested = Instant::new(InstantAction::Clean, InstantState::Requested, "105");

    let inflight = requested.clone().into_inflight().unwrap();
    assert_eq!(inflight.state, InstantState::Inflight);
    assert_eq!(inflight.timestamp, "105");

    let completed = inflight.clone().into_completed().unwrap();
    assert_eq!(completed.state, InstantState::Completed);

    // Requested cannot jump straight to completed.
    let err = requested.into_completed().unwrap_err();
    assert!(matches!(err, CleanError::IllegalTransition { .. }));

    // Completed is terminal.
    assert!(completed.clone().into_inflight().is_err());
    assert!(completed.into_completed().is_err());
}

#[test]
fn state_ordering_ranks_completed_highest() {
    assert!(InstantState::Requested < InstantState::Inflight);
    assert!(InstantState::Inflight < InstantState::Completed);
}
