//! # Reconciliation Scenario Tests
//!
//! End-to-end runs of the reconciler against a recording store.
//!
//! These tests verify:
//! - Plain and secure writes land at `/<stage>/<KEY>` with overwrite disabled
//! - Ignored, literal and unresolved keys never reach the store
//! - A closed stage gate makes zero store calls
//! - One failing key does not stop the others

mod common;

use common::{context, declared, RecordingStore};
use ssm_seed::reconciler::{Classification, Outcome, SkipReason};
use ssm_seed::{reconcile, Reconciler, SyncPolicy};
use std::collections::BTreeSet;
use std::sync::Arc;

fn keys(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| (*k).to_string()).collect()
}

#[tokio::test]
async fn test_plain_reference_is_upserted() {
    let store = Arc::new(RecordingStore::new());
    let report = reconcile(
        &declared(&[("FOO", "${ssm:/x}")]),
        &SyncPolicy::default(),
        &context("dev", &[("FOO", "bar")]),
        store.clone(),
    )
    .await;

    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/dev/FOO");
    assert_eq!(request.classification, Classification::Plain);
    assert_eq!(request.value, "bar");
    assert_eq!(request.description, "FOO");
    assert!(!request.overwrite_existing);

    assert_eq!(
        report.outcome_for("FOO"),
        Some(&Outcome::Upserted {
            key: "FOO".to_string(),
            path: "/dev/FOO".to_string(),
            classification: Classification::Plain,
        })
    );
}

#[tokio::test]
async fn test_secure_key_is_classified_secure() {
    let store = Arc::new(RecordingStore::new());
    let policy = SyncPolicy {
        secure_keys: keys(&["FOO"]),
        ..SyncPolicy::default()
    };
    let report = reconcile(
        &declared(&[("FOO", "${ssm:/x}")]),
        &policy,
        &context("dev", &[("FOO", "bar")]),
        store.clone(),
    )
    .await;

    assert_eq!(store.requests()[0].classification, Classification::Secure);
    assert_eq!(report.upserted(), vec!["FOO"]);
}

#[tokio::test]
async fn test_ignored_key_makes_no_store_call() {
    let store = Arc::new(RecordingStore::new());
    let policy = SyncPolicy {
        ignore_keys: keys(&["FOO"]),
        ..SyncPolicy::default()
    };
    let report = reconcile(
        &declared(&[("FOO", "${ssm:/x}")]),
        &policy,
        &context("dev", &[("FOO", "bar")]),
        store.clone(),
    )
    .await;

    assert_eq!(store.call_count(), 0);
    assert_eq!(report.skipped(), vec![("FOO", SkipReason::Ignored)]);
}

#[tokio::test]
async fn test_missing_value_makes_no_store_call() {
    let store = Arc::new(RecordingStore::new());
    let report = reconcile(
        &declared(&[("FOO", "${ssm:/x}")]),
        &SyncPolicy::default(),
        &context("dev", &[]),
        store.clone(),
    )
    .await;

    assert_eq!(store.call_count(), 0);
    assert_eq!(report.skipped(), vec![("FOO", SkipReason::MissingValue)]);
}

#[tokio::test]
async fn test_empty_env_value_counts_as_missing() {
    let store = Arc::new(RecordingStore::new());
    let report = reconcile(
        &declared(&[("FOO", "${ssm:/x}")]),
        &SyncPolicy::default(),
        &context("dev", &[("FOO", "")]),
        store.clone(),
    )
    .await;

    assert_eq!(store.call_count(), 0);
    assert_eq!(report.skipped(), vec![("FOO", SkipReason::MissingValue)]);
}

#[tokio::test]
async fn test_closed_stage_gate_makes_no_store_calls() {
    let store = Arc::new(RecordingStore::new());
    let policy = SyncPolicy {
        allowed_stages: vec!["prod".to_string()],
        ..SyncPolicy::default()
    };
    let report = reconcile(
        &declared(&[("FOO", "${ssm:/x}"), ("BAR", "${ssm:/y}")]),
        &policy,
        &context("dev", &[("FOO", "1"), ("BAR", "2")]),
        store.clone(),
    )
    .await;

    assert_eq!(store.call_count(), 0);
    assert!(report.is_stage_skipped());
    assert_eq!(report.outcomes.len(), 1);
    match &report.outcomes[0] {
        Outcome::StageSkipped(skipped) => {
            assert_eq!(skipped.stage, "dev");
            assert_eq!(skipped.allowed_stages, vec!["prod"]);
        }
        other => panic!("Expected stage skip, got {other:?}"),
    }
}

#[tokio::test]
async fn test_open_stage_gate_allows_listed_stage() {
    let store = Arc::new(RecordingStore::new());
    let policy = SyncPolicy {
        allowed_stages: vec!["dev".to_string(), "prod".to_string()],
        ..SyncPolicy::default()
    };
    let report = reconcile(
        &declared(&[("FOO", "${ssm:/x}")]),
        &policy,
        &context("prod", &[("FOO", "1")]),
        store.clone(),
    )
    .await;

    assert!(!report.is_stage_skipped());
    assert_eq!(store.requests()[0].path, "/prod/FOO");
}

#[tokio::test]
async fn test_literal_value_is_not_a_reference() {
    let store = Arc::new(RecordingStore::new());
    let report = reconcile(
        &declared(&[("FOO", "literal-value")]),
        &SyncPolicy::default(),
        &context("dev", &[("FOO", "bar")]),
        store.clone(),
    )
    .await;

    assert_eq!(store.call_count(), 0);
    assert_eq!(report.skipped(), vec![("FOO", SkipReason::NotReference)]);
}

#[tokio::test]
async fn test_default_value_wins_over_environment() {
    let store = Arc::new(RecordingStore::new());
    let policy = SyncPolicy {
        default_value: Some("placeholder".to_string()),
        ..SyncPolicy::default()
    };
    reconcile(
        &declared(&[("FOO", "${ssm:/x}"), ("BAR", "${ssm:/y}")]),
        &policy,
        &context("dev", &[("FOO", "from-env")]),
        store.clone(),
    )
    .await;

    let values: Vec<_> = store
        .requests()
        .into_iter()
        .map(|r| (r.key, r.value))
        .collect();
    assert_eq!(
        values,
        vec![
            ("BAR".to_string(), "placeholder".to_string()),
            ("FOO".to_string(), "placeholder".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_failure_for_one_key_does_not_stop_others() {
    let store = Arc::new(RecordingStore::failing(&["A"]));
    let report = reconcile(
        &declared(&[("A", "${ssm:/a}"), ("B", "${ssm:/b}")]),
        &SyncPolicy::default(),
        &context("dev", &[("A", "1"), ("B", "2")]),
        store.clone(),
    )
    .await;

    assert_eq!(store.call_count(), 2);
    assert_eq!(report.upserted(), vec!["B"]);
    let failed = report.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "A");
    assert!(failed[0].1.contains("AccessDeniedException"));
    assert!(report.has_unexpected_failures());
}

#[tokio::test]
async fn test_one_outcome_per_declared_key() {
    let store = Arc::new(RecordingStore::failing(&["FAILS"]));
    let policy = SyncPolicy {
        ignore_keys: keys(&["IGNORED"]),
        secure_keys: keys(&["SECRET"]),
        ..SyncPolicy::default()
    };
    let declared = declared(&[
        ("IGNORED", "${ssm:/i}"),
        ("LITERAL", "plain text"),
        ("MISSING", "${ssm:/m}"),
        ("SECRET", "${ssm:/s}"),
        ("PLAIN", "${ssm:/p}"),
        ("FAILS", "${ssm:/f}"),
    ]);
    let ctx = context(
        "dev",
        &[("SECRET", "s3cr3t"), ("PLAIN", "p"), ("FAILS", "f"), ("LITERAL", "x")],
    );

    let report = Reconciler::new(store.clone())
        .with_concurrency(2)
        .reconcile(&declared, &policy, &ctx)
        .await;

    assert_eq!(report.outcomes.len(), declared.len());
    for key in declared.keys() {
        assert!(report.outcome_for(key).is_some(), "no outcome for {key}");
    }

    let summary = report.summary();
    assert_eq!(summary.upserted, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.failed, 1);

    let classes: Vec<_> = store
        .requests()
        .into_iter()
        .map(|r| (r.key, r.classification))
        .collect();
    assert_eq!(
        classes,
        vec![
            ("FAILS".to_string(), Classification::Plain),
            ("PLAIN".to_string(), Classification::Plain),
            ("SECRET".to_string(), Classification::Secure),
        ]
    );
}

#[tokio::test]
async fn test_classification_is_stable_across_runs() {
    let policy = SyncPolicy {
        secure_keys: keys(&["TOKEN"]),
        ..SyncPolicy::default()
    };
    let declared = declared(&[("TOKEN", "${ssm:/t}"), ("URL", "${ssm:/u}")]);
    let ctx = context("dev", &[("TOKEN", "t"), ("URL", "u")]);

    let first = Arc::new(RecordingStore::new());
    let second = Arc::new(RecordingStore::new());
    reconcile(&declared, &policy, &ctx, first.clone()).await;
    reconcile(&declared, &policy, &ctx, second.clone()).await;

    assert_eq!(first.requests(), second.requests());
}
