//! Application state for the HTTP transport.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::session::{ServiceFactory, SessionStore};

/// How long a forwarded JSON-RPC request may wait for its response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared endpoint state.
///
/// Generic over the MCP service `S` each session runs, so tests can plug in
/// a stub service. The session table is owned here and shared with the
/// idle reaper.
pub struct AppState<S> {
    factory: ServiceFactory<S>,
    sessions: SessionStore,
    version: String,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

// Manual Clone impl: only the Arcs are cloned, `S` need not be Clone.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            sessions: self.sessions.clone(),
            version: self.version.clone(),
            request_timeout: self.request_timeout,
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(
        factory: ServiceFactory<S>,
        sessions: SessionStore,
        version: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            sessions,
            version: version.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown: CancellationToken::new(),
        }
    }

    /// Tie open event streams to the server's lifetime.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn factory(&self) -> &ServiceFactory<S> {
        &self.factory
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}
