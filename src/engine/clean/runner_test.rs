use std::collections::BTreeMap;

use crate::engine::clean::lifecycle::CleanLifecycle;
use crate::engine::clean::plan::CleanPlan;
use crate::engine::clean::policy::RetentionPolicy;
use crate::engine::clean::runner::CleanRunner;
use crate::engine::timeline::{InstantAction, InstantState};
use crate::test_helpers::TableFactory;

#[tokio::test]
async fn cleans_stale_versions_behind_the_retention_boundary() {
    crate::logging::init_for_tests();

    let table = TableFactory::new();
    table.commit("100").commit("101").commit("102").commit("103");
    table.partition("p1");
    for ts in ["100", "101", "102", "103"] {
        table.data_file("p1", "f1", ts);
    }

    let runner = CleanRunner::new(
        table.context(),
        RetentionPolicy::KeepLatestCommits { retain: 2 },
        4,
    );
    let metadata = runner.run().await.unwrap();

    assert_eq!(metadata.earliest_retained.as_deref(), Some("102"));
    assert_eq!(metadata.total_deleted, 2);
    assert_eq!(metadata.total_failed, 0);
    assert!(!table.root().join("p1/f1_100.dat").exists());
    assert!(!table.root().join("p1/f1_101.dat").exists());
    assert!(table.root().join("p1/f1_102.dat").exists());
    assert!(table.root().join("p1/f1_103.dat").exists());

    // The outcome is published as a completed clean at the next instant.
    let timeline = table.timeline();
    let clean = timeline.find("104", InstantAction::Clean).unwrap();
    assert!(clean.is_completed());
}

#[tokio::test]
async fn partitions_with_nothing_stale_still_get_reported() {
    let table = TableFactory::new();
    table.commit("100").commit("101").commit("102").commit("103");
    table.partition("2015/03/16").partition("2015/03/17");

    let runner = CleanRunner::new(
        table.context(),
        RetentionPolicy::KeepLatestCommits { retain: 2 },
        4,
    );
    let metadata = runner.run().await.unwrap();

    assert_eq!(metadata.earliest_retained.as_deref(), Some("102"));
    assert_eq!(metadata.total_deleted, 0);
    assert_eq!(metadata.total_failed, 0);
    assert_eq!(metadata.partitions.len(), 2);
    for partition in ["2015/03/16", "2015/03/17"] {
        let stats = &metadata.partitions[partition];
        assert_eq!(stats.policy, "KEEP_LATEST_COMMITS");
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.failed, 0);
    }
}

#[tokio::test]
async fn few_commits_mean_an_empty_plan_everywhere() {
    let table = TableFactory::new();
    table.commit("100").commit("101");
    table.partition("p1");
    table.data_file("p1", "f1", "100");
    table.data_file("p1", "f1", "101");

    let runner = CleanRunner::new(
        table.context(),
        RetentionPolicy::KeepLatestCommits { retain: 5 },
        4,
    );
    let metadata = runner.run().await.unwrap();

    assert_eq!(metadata.earliest_retained.as_deref(), Some("100"));
    assert_eq!(metadata.total_deleted, 0);
    assert!(table.root().join("p1/f1_100.dat").exists());
}

#[tokio::test]
async fn file_versions_policy_trims_each_group_independently() {
    let table = TableFactory::new();
    table.commit("100").commit("101").commit("102");
    table.partition("p1");
    table.data_file("p1", "f1", "100");
    table.data_file("p1", "f1", "101");
    table.data_file("p1", "f1", "102");
    table.data_file("p1", "f2", "102");

    let runner = CleanRunner::new(
        table.context(),
        RetentionPolicy::KeepLatestFileVersions { retain: 1 },
        4,
    );
    let metadata = runner.run().await.unwrap();

    assert_eq!(metadata.earliest_retained, None);
    assert_eq!(metadata.total_deleted, 2);
    assert!(table.root().join("p1/f1_102.dat").exists());
    assert!(table.root().join("p1/f2_102.dat").exists());
}

#[tokio::test]
async fn resumes_an_interrupted_clean_from_its_persisted_plan() {
    let table = TableFactory::new();
    table.commit("100").commit("101").commit("102").commit("103");
    table.partition("p1");
    for ts in ["100", "101", "102", "103"] {
        table.data_file("p1", "f1", ts);
    }

    // Simulate a crash after the plan was persisted and marked inflight.
    let mut partitions = BTreeMap::new();
    partitions.insert(
        "p1".to_string(),
        vec!["p1/f1_100.dat".to_string(), "p1/f1_101.dat".to_string()],
    );
    let plan = CleanPlan {
        policy: RetentionPolicy::KeepLatestCommits { retain: 2 },
        earliest_retained: Some("102".to_string()),
        partitions,
    };
    let lifecycle = CleanLifecycle::new(table.root());
    let requested = lifecycle.begin(&table.timeline(), &plan).unwrap();
    lifecycle.mark_inflight(requested).unwrap();

    let runner = CleanRunner::new(
        table.context(),
        RetentionPolicy::KeepLatestCommits { retain: 2 },
        4,
    );
    let metadata = runner.run().await.unwrap();

    assert_eq!(metadata.total_deleted, 2);
    let timeline = table.timeline();
    assert!(timeline.pending_clean().is_none());
    let clean = timeline.find("104", InstantAction::Clean).unwrap();
    assert_eq!(clean.state, InstantState::Completed);
}

#[tokio::test]
async fn replans_a_reservation_whose_payload_never_made_it_to_disk() {
    let table = TableFactory::new();
    table.commit("100").commit("101").commit("102").commit("103");
    table.partition("p1");
    for ts in ["100", "101", "102", "103"] {
        table.data_file("p1", "f1", ts);
    }
    // Crash between the marker reservation and the payload write: the
    // requested artifact exists but holds no plan.
    table.raw_marker("104.clean.requested", b"");

    let runner = CleanRunner::new(
        table.context(),
        RetentionPolicy::KeepLatestCommits { retain: 2 },
        4,
    );
    let metadata = runner.run().await.unwrap();

    assert_eq!(metadata.earliest_retained.as_deref(), Some("102"));
    assert_eq!(metadata.total_deleted, 2);
    assert!(!table.root().join("p1/f1_100.dat").exists());
    assert!(table.root().join("p1/f1_102.dat").exists());

    let timeline = table.timeline();
    assert!(timeline.pending_clean().is_none());
    let clean = timeline.find("104", InstantAction::Clean).unwrap();
    assert!(clean.is_completed());
}

#[tokio::test]
async fn resumes_a_clean_that_crashed_before_going_inflight() {
    let table = TableFactory::new();
    table.commit("100").commit("101");
    table.partition("p1");
    table.data_file("p1", "f1", "100");
    table.data_file("p1", "f1", "101");

    let mut partitions = BTreeMap::new();
    partitions.insert("p1".to_string(), vec!["p1/f1_100.dat".to_string()]);
    let plan = CleanPlan {
        policy: RetentionPolicy::KeepLatestCommits { retain: 1 },
        earliest_retained: Some("101".to_string()),
        partitions,
    };
    let lifecycle = CleanLifecycle::new(table.root());
    lifecycle.begin(&table.timeline(), &plan).unwrap();

    let runner = CleanRunner::new(
        table.context(),
        RetentionPolicy::KeepLatestCommits { retain: 1 },
        4,
    );
    let metadata = runner.run().await.unwrap();

    assert_eq!(metadata.total_deleted, 1);
    assert!(!table.root().join("p1/f1_100.dat").exists());
    assert!(table.timeline().pending_clean().is_none());
}
