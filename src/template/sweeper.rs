//! Periodic removal of expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use super::cache::RenderedPageCache;
use crate::observability::metrics;

const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Background task sweeping a [`RenderedPageCache`] every half TTL.
pub struct CacheSweeper {
    cache: Arc<RenderedPageCache>,
    interval: Duration,
}

impl CacheSweeper {
    pub fn new(cache: Arc<RenderedPageCache>) -> Self {
        let interval = (cache.ttl() / 2).max(MIN_INTERVAL);
        Self { cache, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sweep until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(interval = ?self.interval, ttl = ?self.cache.ttl(), "Cache sweeper starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Cache sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn sweep(&self) {
        let removed = self.cache.clear_expired();
        let remaining = self.cache.len();

        if removed > 0 {
            tracing::trace!(removed, remaining, "Expired pages swept");
        }
        metrics::set_cache_entries(remaining);
    }
}
