//! Integration tests for the Store runtime
//!
//! Covers the action → reducer → effects → action feedback loop, effect
//! completion tracking, observers, and shutdown.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::time::Duration;
use todo_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use todo_runtime::{Store, StoreConfig, StoreError};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Start async work that reports back
    Fetch { value: u32 },
    /// Async work finished
    Fetched { value: u32 },
    /// Start several independent pieces of work
    FanOut { count: u32 },
    /// One piece of fan-out work finished
    Part,
    /// Schedule an action for later
    Schedule { delay_ms: u64 },
    /// Delayed action arrived
    Tick,
    /// Work that never reports back
    Sleep { ms: u64 },
}

#[derive(Debug, Clone, Default)]
struct TestState {
    fetched: Vec<u32>,
    parts: u32,
    ticks: u32,
}

#[derive(Clone)]
struct TestEnvironment;

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Fetch { value } => smallvec![Effect::future(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Some(TestAction::Fetched { value })
            })],
            TestAction::Fetched { value } => {
                state.fetched.push(value);
                SmallVec::new()
            },
            TestAction::FanOut { count } => {
                let parts = (0..count)
                    .map(|i| {
                        Effect::future(async move {
                            tokio::time::sleep(Duration::from_millis(5 * u64::from(i + 1))).await;
                            Some(TestAction::Part)
                        })
                    })
                    .collect();
                smallvec![Effect::Parallel(parts)]
            },
            TestAction::Part => {
                state.parts += 1;
                SmallVec::new()
            },
            TestAction::Schedule { delay_ms } => smallvec![Effect::delay(
                Duration::from_millis(delay_ms),
                TestAction::Tick
            )],
            TestAction::Tick => {
                state.ticks += 1;
                smallvec![Effect::None]
            },
            TestAction::Sleep { ms } => smallvec![Effect::future(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                None
            })],
        }
    }
}

fn store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    Store::new(TestState::default(), TestReducer, TestEnvironment)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn future_effect_feeds_action_back_before_handle_completes() {
    let store = store();

    let mut handle = store.send(TestAction::Fetch { value: 7 }).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    let fetched = store.state(|s| s.fetched.clone()).await;
    assert_eq!(fetched, vec![7]);
}

#[tokio::test]
async fn parallel_effects_share_one_handle() {
    let store = store();

    let mut handle = store.send(TestAction::FanOut { count: 4 }).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.state(|s| s.parts).await, 4);
    assert_eq!(handle.pending(), 0);
}

#[tokio::test]
async fn delay_effect_dispatches_after_duration() {
    let store = store();
    let mut revisions = store.subscribe_state();
    revisions.borrow_and_update();

    let _ = store.send(TestAction::Schedule { delay_ms: 30 }).await.unwrap();
    revisions.borrow_and_update();
    assert_eq!(store.state(|s| s.ticks).await, 0);

    tokio::time::timeout(Duration::from_secs(1), revisions.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.state(|s| s.ticks).await, 1);
}

#[tokio::test]
async fn handle_does_not_wait_for_delay_effects() {
    let store = store();

    let mut handle = store.send(TestAction::Schedule { delay_ms: 5_000 }).await.unwrap();

    assert_eq!(handle.pending(), 0);
    handle.wait_with_timeout(Duration::from_millis(50)).await.unwrap();
    assert_eq!(store.state(|s| s.ticks).await, 0);
    // Still pending for shutdown
    assert_eq!(store.pending_effects(), 1);
}

#[tokio::test]
async fn shutdown_waits_for_delay_effects() {
    let store = store();

    let _ = store.send(TestAction::Schedule { delay_ms: 30 }).await.unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test]
async fn action_observers_see_effect_output_only() {
    let store = store();
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(TestAction::Fetch { value: 3 }).await.unwrap();
    handle.wait().await;

    // The initial Fetch is not broadcast, only what the effect produced
    let observed = rx.recv().await.unwrap();
    assert_eq!(observed, TestAction::Fetched { value: 3 });
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn state_revision_bumps_on_every_reduce() {
    let store = store();
    let mut revisions = store.subscribe_state();
    let start = *revisions.borrow_and_update();

    let mut handle = store.send(TestAction::Fetch { value: 1 }).await.unwrap();
    handle.wait().await;

    assert!(revisions.has_changed().unwrap());
    // Fetch and Fetched each ran the reducer once
    assert_eq!(*revisions.borrow_and_update(), start + 2);
}

#[tokio::test]
async fn concurrent_sends_serialize_at_the_reducer() {
    let store = store();

    let sends = (0..10).map(|value| {
        let store = store.clone();
        async move { store.send(TestAction::Fetch { value }).await }
    });
    let handles = futures::future::join_all(sends).await;

    for handle in handles {
        handle.unwrap().wait_with_timeout(Duration::from_secs(1)).await.unwrap();
    }

    let mut fetched = store.state(|s| s.fetched.clone()).await;
    fetched.sort_unstable();
    assert_eq!(fetched, (0..10).collect::<Vec<_>>());
}

#[tokio::test]
async fn shutdown_waits_for_pending_effects() {
    let store = store();

    let _ = store.send(TestAction::Sleep { ms: 30 }).await.unwrap();
    assert_eq!(store.pending_effects(), 1);

    store.shutdown(Duration::from_secs(1)).await.unwrap();
    assert_eq!(store.pending_effects(), 0);

    let rejected = store.send(TestAction::Tick).await;
    assert!(matches!(rejected, Err(StoreError::ShutdownInProgress)));
}

#[tokio::test]
async fn shutdown_times_out_with_running_effects() {
    let config = StoreConfig::default().with_shutdown_timeout(Duration::from_millis(30));
    let store = Store::with_config(TestState::default(), TestReducer, TestEnvironment, config);

    let _ = store.send(TestAction::Sleep { ms: 5_000 }).await.unwrap();

    let result = store.shutdown_default().await;
    assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
}
