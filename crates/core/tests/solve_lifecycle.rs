//! End-to-end lifecycle: configure, dispatch, price, persist, audit.

use std::sync::{Arc, Mutex};

use wheel_core::testing::{fixtures, MockRemoteSolver};
use wheel_core::{
    audit_cover, load_config_from_str, system_cost, validate_config, CancellationToken,
    OffloadError, ProgressCallback, SavedSelection, SelectionStore, SolveDispatcher, SolveLocation,
    SqliteSelectionStore,
};

const CONFIG: &str = r#"
[engine]
prune_interval = 5

[stakes]
pair = 1.0
"#;

#[tokio::test]
async fn test_local_lifecycle() {
    let config = load_config_from_str(CONFIG).unwrap();
    validate_config(&config).unwrap();

    let dispatcher = SolveDispatcher::from_config(
        wheel_core::Engine::new(config.engine.clone()),
        config.offload.as_ref(),
    )
    .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let progress: ProgressCallback = {
        let seen = Arc::clone(&seen);
        Arc::new(move |fraction: f64| seen.lock().unwrap().push(fraction))
    };

    let request = fixtures::request(10, 4, 2);
    let outcome = dispatcher
        .solve(request.clone(), Some(progress), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.location, SolveLocation::Local);

    let seen = seen.lock().unwrap().clone();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last().copied(), Some(1.0));

    let solution = outcome.solution;
    assert_eq!(solution.stats.coverage_percent, 100.0);
    assert!(solution.stats.reduction_percent > 0.0);

    // 6 pairs * 1.0 + 4 triples * 0.5 + 1 quad * 1.0 = 9.0 per ticket
    let cost = system_cost(&solution.tickets, &config.stakes);
    assert_eq!(cost.total, 9.0 * solution.tickets.len() as f64);

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteSelectionStore::new(&dir.path().join("wheel.db")).unwrap();
    let mut selection = SavedSelection::new(request.pool.clone(), 4, 2, config.stakes);
    selection.last_tickets = Some(solution.tickets.clone());
    store.save(&selection).unwrap();

    let loaded = store.load().unwrap().unwrap();
    let tickets = loaded.last_tickets.as_ref().unwrap();
    let report = audit_cover(&loaded.pool, loaded.m, tickets).unwrap();
    assert!(report.fully_certified);
    assert_eq!(report.duplicate_tickets, 0);
}

#[tokio::test]
async fn test_remote_failure_lifecycle_falls_back() {
    let remote = Arc::new(MockRemoteSolver::new());
    remote
        .set_next_error(OffloadError::Api {
            status: 500,
            message: "boom".to_string(),
        })
        .await;

    let dispatcher = SolveDispatcher::with_remote(wheel_core::Engine::default(), remote.clone(), 1);
    let outcome = dispatcher
        .solve(fixtures::request(7, 3, 2), None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.location, SolveLocation::Local);
    assert!(outcome.solution.stats.fully_certified);
    assert_eq!(remote.recorded_requests().await.len(), 1);
}
