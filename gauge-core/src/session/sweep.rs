//! Active expiry sweep
//!
//! Lazy expiry checks only fire when a session is accessed; the sweep
//! guarantees that an abandoned attempt still terminates. It takes the same
//! per-session lock as interactive operations, so a `complete` racing the
//! deadline resolves to exactly one terminal transition.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::events::{EventBus, GaugeEvent};

use super::store::MemorySessionStore;

/// Periodic scanner that force-expires overdue sessions
pub struct ExpirySweeper {
    store: Arc<MemorySessionStore>,
    bus: Arc<dyn EventBus>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<MemorySessionStore>, bus: Arc<dyn EventBus>, interval: Duration) -> Self {
        Self {
            store,
            bus,
            interval,
        }
    }

    /// Run until the shutdown signal flips
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "expiry sweep started");
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let expired = self.sweep_once().await;
                    if !expired.is_empty() {
                        info!(count = expired.len(), "expiry sweep transitioned sessions");
                    }
                }
                _ = shutdown.changed() => {
                    info!("expiry sweep stopping");
                    break;
                }
            }
        }
    }

    /// Scan every session once, expiring those past their deadline.
    ///
    /// Returns the ids that transitioned. Sessions whose lock cannot be
    /// acquired in time are skipped; the holder performs the lazy expiry
    /// check itself.
    pub async fn sweep_once(&self) -> Vec<Uuid> {
        let now = Utc::now();
        let mut expired = Vec::new();

        for id in self.store.session_ids().await {
            let transitioned = self
                .store
                .with_session(id, |record| {
                    if record.session.is_expired_at(now) {
                        record.session.mark_expired();
                        true
                    } else {
                        false
                    }
                })
                .await;

            match transitioned {
                Ok(true) => {
                    debug!(session = %id, "session expired by sweep");
                    expired.push(id);
                }
                Ok(false) => {}
                Err(SessionError::Contention(_)) => {
                    warn!(session = %id, "session locked, skipping in this sweep");
                }
                Err(_) => {}
            }
        }

        for id in &expired {
            self.bus.publish(GaugeEvent::SessionExpired { session_id: *id }).await;
        }
        expired
    }
}
