use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::future::join_all;
use tracing::warn;

use super::{Session, SessionError, SessionId, SessionResult};

/// Concurrent session table.
///
/// Operations on the same id are serialized by the map's shard locks;
/// different ids proceed in parallel. Cloning shares the table.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<SessionId, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under its own id. Never replaces an existing entry.
    pub fn put(&self, session: Arc<Session>) -> SessionResult<()> {
        match self.sessions.entry(session.id().clone()) {
            Entry::Occupied(entry) => Err(SessionError::AlreadyExists(entry.key().to_string())),
            Entry::Vacant(entry) => {
                entry.insert(session);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// The only eviction primitive. Among concurrent callers for the same id
    /// exactly one receives the session; that caller owns its teardown.
    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    /// Remove the session only if `predicate` still holds under the entry lock.
    pub fn remove_if<F>(&self, id: &str, predicate: F) -> Option<Arc<Session>>
    where
        F: FnOnce(&Session) -> bool,
    {
        self.sessions
            .remove_if(id, |_, session| predicate(session.as_ref()))
            .map(|(_, session)| session)
    }

    /// Snapshot of every registered session.
    pub fn all(&self) -> Vec<(SessionId, Arc<Session>)> {
        self.sessions
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Evict and tear down every session, e.g. on server shutdown.
    pub async fn close_all(&self) {
        let evicted: Vec<Arc<Session>> = self
            .all()
            .into_iter()
            .filter_map(|(id, _)| self.remove(id.as_str()))
            .collect();

        join_all(evicted.iter().map(|session| async move {
            if let Err(e) = session.close().await {
                warn!(session_id = %session.id(), "Error closing session: {}", e);
            }
        }))
        .await;
    }
}
