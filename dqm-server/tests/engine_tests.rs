//! Engine-level tests: executor atomicity, score derivation, persistence,
//! and aggregate hydration across a simulated restart.

use std::sync::Arc;

use dqm_common::config::ChecksConfig;
use dqm_common::{db::init_database, Error};
use dqm_server::checks::{executor::CheckExecutor, CheckRegistry, CheckStatus};
use dqm_server::stats::AggregateTracker;
use dqm_server::store::DatasetStore;
use sqlx::SqlitePool;

struct Engine {
    pool: SqlitePool,
    store: DatasetStore,
    tracker: Arc<AggregateTracker>,
    executor: CheckExecutor,
}

async fn setup_engine() -> (Engine, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("dqm.db")).await.unwrap();
    let store = DatasetStore::new(pool.clone());
    let tracker = Arc::new(AggregateTracker::new());
    let registry = Arc::new(CheckRegistry::standard(ChecksConfig::default()));
    let executor = CheckExecutor::new(pool.clone(), store.clone(), registry, tracker.clone());
    (
        Engine {
            pool,
            store,
            tracker,
            executor,
        },
        dir,
    )
}

#[tokio::test]
async fn run_produces_registry_order_and_score() {
    let (engine, _dir) = setup_engine().await;
    let dataset = engine
        .store
        .create("orders.csv", b"region,amount\nnorth,10\nsouth,12\nnorth,")
        .await
        .unwrap();
    engine.tracker.dataset_created();

    let run = engine.executor.run(dataset.id).await.unwrap();

    let names: Vec<&str> = run.checks.iter().map(|c| c.check_name.as_str()).collect();
    assert_eq!(names, vec!["null_check", "duplicate_check", "anomaly_check"]);

    // One null row fails one of three checks
    assert_eq!(run.checks[0].status, CheckStatus::Fail);
    assert_eq!(run.checks[0].failed_rows, 1);
    assert_eq!(run.checks[1].status, CheckStatus::Pass);
    assert_eq!(run.checks[2].status, CheckStatus::Pass);
    assert_eq!(run.overall_score, 67);
}

#[tokio::test]
async fn run_rejects_unknown_dataset_without_touching_stats() {
    let (engine, _dir) = setup_engine().await;

    let err = engine.executor.run(12345).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let snapshot = engine.tracker.snapshot();
    assert_eq!(snapshot.total_checks, 0);
    assert_eq!(snapshot.last_run, None);
}

#[tokio::test]
async fn run_rejects_empty_dataset_without_touching_stats() {
    let (engine, _dir) = setup_engine().await;
    let id = engine.store.create_empty("placeholder").await.unwrap();
    engine.tracker.dataset_created();

    let err = engine.executor.run(id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidDataset(_)));

    let snapshot = engine.tracker.snapshot();
    assert_eq!(snapshot.total_datasets, 1);
    assert_eq!(snapshot.total_checks, 0);
    assert_eq!(snapshot.last_run, None);

    // Nothing persisted either
    let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM check_runs")
        .fetch_one(&engine.pool)
        .await
        .unwrap();
    assert_eq!(runs, 0);
}

#[tokio::test]
async fn perfect_dataset_scores_exactly_100() {
    let (engine, _dir) = setup_engine().await;
    let dataset = engine
        .store
        .create("clean.csv", b"name,code\nalpha,x1\nbeta,x2\ngamma,x3")
        .await
        .unwrap();

    let run = engine.executor.run(dataset.id).await.unwrap();
    assert!(run.checks.iter().all(|c| c.status == CheckStatus::Pass));
    assert_eq!(run.overall_score, 100);
}

#[tokio::test]
async fn every_check_failing_scores_0() {
    // Null row, duplicate pair, and an extreme outlier in one dataset
    let mut content = String::from("amount,note\n");
    for _ in 0..20 {
        content.push_str("10,ok\n");
    }
    content.push_str("1000000,ok\n");
    content.push_str("10,ok\n"); // duplicate of an earlier row
    content.push_str(",missing\n");

    let (engine, _dir) = setup_engine().await;
    let dataset = engine.store.create("worst.csv", content.as_bytes()).await.unwrap();

    let run = engine.executor.run(dataset.id).await.unwrap();
    assert!(run.checks.iter().all(|c| c.status == CheckStatus::Fail));
    assert_eq!(run.overall_score, 0);
}

#[tokio::test]
async fn runs_are_persisted_with_their_results() {
    let (engine, _dir) = setup_engine().await;
    let dataset = engine
        .store
        .create("data.csv", b"a,b\n1,x\n2,y")
        .await
        .unwrap();

    engine.executor.run(dataset.id).await.unwrap();
    engine.executor.run(dataset.id).await.unwrap();

    let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM check_runs")
        .fetch_one(&engine.pool)
        .await
        .unwrap();
    let results: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM check_results")
        .fetch_one(&engine.pool)
        .await
        .unwrap();
    assert_eq!(runs, 2);
    assert_eq!(results, 6);
}

#[tokio::test]
async fn hydration_rebuilds_the_same_snapshot() {
    let (engine, _dir) = setup_engine().await;

    let clean = engine
        .store
        .create("clean.csv", b"a,b\nx,y\nz,w")
        .await
        .unwrap();
    engine.tracker.dataset_created();
    let dirty = engine
        .store
        .create("dirty.csv", b"a,b\nx,y\nx,y")
        .await
        .unwrap();
    engine.tracker.dataset_created();

    engine.executor.run(clean.id).await.unwrap();
    engine.executor.run(dirty.id).await.unwrap();

    let before = engine.tracker.snapshot();

    // Simulated restart: a new tracker built from the same database
    let rebuilt = AggregateTracker::hydrate(&engine.pool).await.unwrap();
    let after = rebuilt.snapshot();

    assert_eq!(after, before);
    assert_eq!(after.total_datasets, 2);
    assert_eq!(after.total_checks, 6);
    assert_eq!(after.failed_checks, 1);
    assert_eq!(after.average_quality_score, 84);
    assert!(after.last_run.is_some());
}
