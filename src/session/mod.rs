//! Session-oriented transport state.
//!
//! A [`Session`] binds one client connection lifecycle to one dispatch
//! context (its own MCP service and upstream client) through a
//! [`TransportHandle`]. Sessions live in a [`SessionStore`] and are evicted by
//! the [`IdleReaper`] or by the client.

mod error;
mod handle;
mod lifecycle;
mod message;
mod reaper;
mod store;

#[cfg(test)]
mod reaper_test;
#[cfg(test)]
mod store_test;

pub use error::{SessionError, SessionResult};
pub use handle::TransportHandle;
pub use lifecycle::{Lifecycle, SessionState};
pub use message::ClientMessage;
pub use reaper::IdleReaper;
pub use store::SessionStore;

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rmcp::ServerHandler;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// How long a new session may take to answer `initialize`.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds a fresh dispatch context for every new session.
pub type ServiceFactory<S> = Arc<dyn Fn() -> Result<S, SessionError> + Send + Sync>;

/// Opaque, server-issued session identifier (UUID v4, simple form).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct Session {
    id: SessionId,
    handle: TransportHandle,
    lifecycle: Lifecycle,
    created_at: Instant,
    /// Nanoseconds since `created_at`; only ever grows.
    last_activity_ns: AtomicU64,
}

impl Session {
    pub fn new(handle: TransportHandle) -> Arc<Self> {
        Arc::new(Self {
            id: SessionId::generate(),
            handle,
            lifecycle: Lifecycle::default(),
            created_at: Instant::now(),
            last_activity_ns: AtomicU64::new(0),
        })
    }

    /// Spawn `service` for a new session and run the initialize handshake.
    ///
    /// On success the session is `Active` and the initialize response is
    /// returned alongside it. On failure the session has already been torn
    /// down; it must not be registered.
    pub async fn open<S: ServerHandler>(
        service: S,
        initialize: &ClientMessage,
    ) -> SessionResult<(Arc<Self>, Value)> {
        let session = Self::new(TransportHandle::spawn(service));
        let response = session.handshake(initialize).await?;
        Ok((session, response))
    }

    pub async fn handshake(&self, initialize: &ClientMessage) -> SessionResult<Value> {
        let outcome = match self.handle.request(initialize, HANDSHAKE_TIMEOUT).await {
            Ok(response) => match response.get("error") {
                None => Ok(response),
                Some(error) => Err(SessionError::Handshake(
                    error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("initialize was rejected")
                        .to_string(),
                )),
            },
            Err(e) => Err(SessionError::Handshake(e.to_string())),
        };

        match outcome {
            Ok(response) => {
                self.touch(Instant::now());
                self.lifecycle.activate();
                info!(session_id = %self.id, "Session initialized");
                Ok(response)
            }
            Err(e) => {
                if let Err(teardown) = self.close().await {
                    debug!(session_id = %self.id, "Teardown after failed handshake: {}", teardown);
                }
                Err(e)
            }
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn handle(&self) -> &TransportHandle {
        &self.handle
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    /// Record activity at `now`. Earlier instants never move the clock back.
    pub fn touch(&self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.created_at).as_nanos();
        let elapsed = u64::try_from(elapsed).unwrap_or(u64::MAX);
        self.last_activity_ns.fetch_max(elapsed, Ordering::SeqCst);
    }

    pub fn last_activity(&self) -> Instant {
        self.created_at + Duration::from_nanos(self.last_activity_ns.load(Ordering::SeqCst))
    }

    /// Strictly longer than `timeout` without activity.
    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity()) > timeout
    }

    /// Tear the session down. Only the first caller does the work.
    pub async fn close(&self) -> SessionResult<()> {
        if !self.lifecycle.begin_close() {
            return Ok(());
        }
        let result = self.handle.shutdown().await;
        self.lifecycle.finish_close();
        debug!(session_id = %self.id, "Session closed");
        result
    }
}
