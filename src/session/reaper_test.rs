use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::session::*;
use crate::test_support::session_with_peer;

fn reaper(store: &SessionStore, timeout_secs: u64, interval_secs: u64) -> IdleReaper {
    IdleReaper::new(
        store.clone(),
        SessionConfig {
            idle_timeout: Duration::from_secs(timeout_secs),
            sweep_interval: Duration::from_secs(interval_secs),
        },
    )
}

#[tokio::test]
async fn test_reap_respects_idle_boundary() {
    let store = SessionStore::new();
    let reaper = reaper(&store, 1800, 60);
    let (session, _peer) = session_with_peer();
    session.touch(Instant::now());
    let last = session.last_activity();
    store.put(Arc::clone(&session)).unwrap();

    assert!(reaper.reap_idle(last + Duration::from_secs(1799)).is_empty());
    assert!(reaper.reap_idle(last + Duration::from_secs(1800)).is_empty());
    assert_eq!(store.len(), 1);

    let evicted = reaper.reap_idle(last + Duration::from_secs(1801));
    assert_eq!(evicted.len(), 1);
    assert!(store.get(session.id().as_str()).is_none());
}

#[tokio::test]
async fn test_activity_refresh_postpones_eviction() {
    let store = SessionStore::new();
    let reaper = reaper(&store, 1800, 60);
    let (session, _peer) = session_with_peer();
    let t0 = Instant::now();
    session.touch(t0);
    store.put(Arc::clone(&session)).unwrap();

    session.touch(t0 + Duration::from_secs(1000));

    assert!(reaper.reap_idle(t0 + Duration::from_secs(1801)).is_empty());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_sessions_with_dead_transport_are_evicted() {
    let store = SessionStore::new();
    let reaper = reaper(&store, 1800, 60);
    let (session, peer) = session_with_peer();
    store.put(Arc::clone(&session)).unwrap();
    drop(peer);

    // Let the reader task observe end-of-stream.
    while !session.handle().is_closed() {
        tokio::task::yield_now().await;
    }

    assert_eq!(reaper.reap_idle(Instant::now()).len(), 1);
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_background_sweep_evicts_and_stops_on_shutdown() {
    let store = SessionStore::new();
    let (idle, _idle_peer) = session_with_peer();
    idle.touch(Instant::now());
    store.put(Arc::clone(&idle)).unwrap();

    let shutdown = CancellationToken::new();
    let task = reaper(&store, 5, 1).spawn(shutdown.clone());

    tokio::time::sleep(Duration::from_secs(8)).await;
    assert!(store.is_empty());

    shutdown.cancel();
    task.await.unwrap();
}
