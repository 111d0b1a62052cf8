use std::collections::HashSet;
use std::sync::Arc;

use crate::session::*;
use crate::test_support::session_with_peer;

#[tokio::test]
async fn test_put_get_remove() {
    let store = SessionStore::new();
    let (session, _peer) = session_with_peer();
    let id = session.id().clone();

    store.put(Arc::clone(&session)).unwrap();
    assert_eq!(store.len(), 1);
    assert!(Arc::ptr_eq(&store.get(id.as_str()).unwrap(), &session));

    assert!(store.remove(id.as_str()).is_some());
    assert!(store.get(id.as_str()).is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_put_never_replaces() {
    let store = SessionStore::new();
    let (session, _peer) = session_with_peer();

    store.put(Arc::clone(&session)).unwrap();
    let err = store.put(Arc::clone(&session)).unwrap_err();

    assert!(matches!(err, SessionError::AlreadyExists(ref id) if id == session.id().as_str()));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_unknown_id_is_absent() {
    let store = SessionStore::new();
    assert!(store.get("does-not-exist").is_none());
    assert!(store.remove("does-not-exist").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_yields_distinct_ids() {
    let store = SessionStore::new();

    let tasks: Vec<_> = (0..64)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                let (session, peer) = session_with_peer();
                store.put(Arc::clone(&session)).unwrap();
                (session.id().clone(), peer)
            })
        })
        .collect();

    let mut ids = HashSet::new();
    let mut peers = Vec::new();
    for task in tasks {
        let (id, peer) = task.await.unwrap();
        ids.insert(id);
        peers.push(peer);
    }

    assert_eq!(ids.len(), 64);
    assert_eq!(store.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_removal_has_one_winner() {
    let store = SessionStore::new();
    let (session, _peer) = session_with_peer();
    let id = session.id().to_string();
    store.put(session).unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move { store.remove(&id).is_some() })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_close_all_empties_store() {
    let store = SessionStore::new();
    let (a, _peer_a) = session_with_peer();
    let (b, _peer_b) = session_with_peer();
    store.put(Arc::clone(&a)).unwrap();
    store.put(Arc::clone(&b)).unwrap();

    store.close_all().await;

    assert!(store.is_empty());
    assert_eq!(a.state(), SessionState::Closed);
    assert_eq!(b.state(), SessionState::Closed);
}
