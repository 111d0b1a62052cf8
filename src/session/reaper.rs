use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Session, SessionStore};
use crate::config::SessionConfig;

/// Periodically evicts sessions that have been idle for too long.
#[derive(Clone)]
pub struct IdleReaper {
    store: SessionStore,
    idle_timeout: Duration,
    sweep_interval: Duration,
}

impl IdleReaper {
    pub fn new(store: SessionStore, config: SessionConfig) -> Self {
        Self {
            store,
            idle_timeout: config.idle_timeout,
            sweep_interval: config.sweep_interval,
        }
    }

    /// Remove every session idle for longer than the timeout at `now`, or
    /// whose service has already gone away. Returns the evicted sessions;
    /// the caller owns their teardown.
    pub fn reap_idle(&self, now: Instant) -> Vec<Arc<Session>> {
        self.store
            .all()
            .into_iter()
            .filter_map(|(id, _)| {
                self.store.remove_if(id.as_str(), |session| {
                    session.is_idle(now, self.idle_timeout) || session.handle().is_closed()
                })
            })
            .collect()
    }

    /// One sweep: evict, then tear down in the background.
    pub fn sweep(&self, now: Instant) -> usize {
        let evicted = self.reap_idle(now);
        let count = evicted.len();

        for session in evicted {
            tokio::spawn(async move {
                if let Err(e) = session.close().await {
                    warn!(session_id = %session.id(), "Error closing idle session: {}", e);
                }
            });
        }

        if count > 0 {
            info!(
                "Evicted {} idle session(s), {} remaining",
                count,
                self.store.len()
            );
        }
        count
    }

    /// Sweep every interval until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.sweep_interval, self.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep(Instant::now());
                }
            }
        }
        debug!("Idle reaper stopped");
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
