use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::net::types::{Cell, IconResponse};
use crate::test_helpers::FakeApi;

fn grid_with(cells: u32) -> Grid {
    Grid {
        cells: (0..cells).map(|x| Cell::new(1, 1, x, 0)).collect(),
        ..Grid::default()
    }
}

fn gateway() -> (Arc<FakeApi>, PersistenceGateway) {
    let api = Arc::new(FakeApi::new());
    let gateway = PersistenceGateway::spawn(api.clone());
    (api, gateway)
}

// =============================================================
// Single saves
// =============================================================

#[tokio::test]
async fn successful_save_reports_saved() {
    let (api, mut gateway) = gateway();
    let seq = gateway.submit(grid_with(2));
    assert_eq!(seq, 1);
    assert_eq!(gateway.unresolved(), 1);

    let outcome = gateway.next_outcome().await.unwrap();
    assert_eq!(outcome.seq, 1);
    assert!(matches!(outcome.result, SaveResult::Saved));
    assert_eq!(api.saves(), vec![grid_with(2)]);
    assert_eq!(gateway.unresolved(), 0);
}

#[tokio::test]
async fn failed_save_reports_error() {
    let (api, mut gateway) = gateway();
    api.fail_saves(1);
    gateway.submit(grid_with(1));

    let outcome = gateway.next_outcome().await.unwrap();
    match outcome.result {
        SaveResult::Failed(ApiError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(api.saves().is_empty());
}

#[tokio::test]
async fn next_outcome_is_none_when_idle() {
    let (_api, mut gateway) = gateway();
    assert!(gateway.next_outcome().await.is_none());
    assert!(gateway.try_next_outcome().is_none());
    assert_eq!(gateway.last_seq(), None);
}

#[tokio::test]
async fn sequence_numbers_increase() {
    let (_api, mut gateway) = gateway();
    assert_eq!(gateway.submit(grid_with(0)), 1);
    assert_eq!(gateway.submit(grid_with(0)), 2);
    assert_eq!(gateway.last_seq(), Some(2));
}

// =============================================================
// Ordering
// =============================================================

#[tokio::test(start_paused = true)]
async fn queued_snapshots_collapse_to_newest() {
    let (api, mut gateway) = gateway();
    api.delay_saves(Duration::from_millis(100));

    let a = gateway.submit(grid_with(1));
    // Let the worker pick up the first snapshot before queueing more.
    tokio::time::sleep(Duration::from_millis(1)).await;
    let b = gateway.submit(grid_with(2));
    let c = gateway.submit(grid_with(3));

    let mut outcomes = Vec::new();
    while let Some(outcome) = gateway.next_outcome().await {
        outcomes.push(outcome);
    }

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].seq, a);
    assert!(matches!(outcomes[0].result, SaveResult::Saved));
    assert_eq!(outcomes[1].seq, b);
    assert!(matches!(outcomes[1].result, SaveResult::Superseded { by } if by == c));
    assert_eq!(outcomes[2].seq, c);
    assert!(matches!(outcomes[2].result, SaveResult::Saved));

    assert_eq!(api.saves(), vec![grid_with(1), grid_with(3)]);
}

#[tokio::test(start_paused = true)]
async fn failure_does_not_block_later_saves() {
    let (api, mut gateway) = gateway();
    api.fail_saves(1);
    gateway.submit(grid_with(1));
    let first = gateway.next_outcome().await.unwrap();
    assert!(matches!(first.result, SaveResult::Failed(_)));

    gateway.submit(grid_with(1));
    let second = gateway.next_outcome().await.unwrap();
    assert!(matches!(second.result, SaveResult::Saved));
    assert_eq!(api.saves().len(), 1);
}

#[tokio::test]
async fn try_next_outcome_drains_ready_results() {
    let (_api, mut gateway) = gateway();
    gateway.submit(grid_with(1));
    while gateway.unresolved() > 0 {
        if gateway.try_next_outcome().is_none() {
            tokio::task::yield_now().await;
        }
    }
    assert!(gateway.try_next_outcome().is_none());
}

// =============================================================
// Lost worker
// =============================================================

/// Panics inside `update_grid` for the first `crashes` saves.
struct CrashingApi {
    crashes: AtomicUsize,
}

#[async_trait]
impl GridApi for CrashingApi {
    async fn search_icons(&self, _query: &str, _limit: u32) -> Result<IconResponse, ApiError> {
        Ok(IconResponse::default())
    }

    async fn update_grid(&self, _grid: &Grid) -> Result<(), ApiError> {
        let left = self.crashes.load(Ordering::SeqCst);
        if left > 0 {
            self.crashes.store(left - 1, Ordering::SeqCst);
            panic!("grid client crashed");
        }
        Ok(())
    }
}

#[tokio::test]
async fn panicking_client_fails_that_save_only() {
    let api = Arc::new(CrashingApi { crashes: AtomicUsize::new(1) });
    let mut gateway = PersistenceGateway::spawn(api);

    gateway.submit(grid_with(1));
    let first = gateway.next_outcome().await.unwrap();
    assert_eq!(first.seq, 1);
    assert!(matches!(first.result, SaveResult::Failed(ApiError::Transport(_))));

    gateway.submit(grid_with(1));
    let second = gateway.next_outcome().await.unwrap();
    assert_eq!(second.seq, 2);
    assert!(matches!(second.result, SaveResult::Saved));
}

#[test]
fn stopped_worker_reports_latest_save_failed() {
    let runtime = || tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();

    // The worker dies with the runtime it was spawned on.
    let first = runtime();
    let (_api, mut gateway) = first.block_on(async { gateway() });
    drop(first);

    runtime().block_on(async {
        assert_eq!(gateway.submit(grid_with(1)), 1);
        assert_eq!(gateway.submit(grid_with(2)), 2);
        assert_eq!(gateway.unresolved(), 2);

        let outcome = gateway.next_outcome().await.unwrap();
        assert_eq!(outcome.seq, 2);
        assert!(matches!(outcome.result, SaveResult::Failed(ApiError::Transport(_))));
        assert_eq!(gateway.unresolved(), 0);
        assert!(gateway.next_outcome().await.is_none());
    });
}

#[test]
fn stopped_worker_is_seen_without_waiting() {
    let first = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let (_api, mut gateway) = first.block_on(async { gateway() });
    drop(first);

    gateway.submit(grid_with(1));
    let outcome = gateway.try_next_outcome().unwrap();
    assert!(matches!(outcome.result, SaveResult::Failed(_)));
    assert!(gateway.try_next_outcome().is_none());
}
