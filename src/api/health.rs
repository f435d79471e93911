//! Shared health state for the /health endpoint.
//! Updated by the fetcher after every request to either feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Feed;

#[derive(Default)]
struct FeedHealth {
    /// Nanosecond timestamp of the last successful fetch (0 = none).
    last_success_ns: AtomicU64,
    /// Failures since the last success.
    consecutive_failures: AtomicU64,
    total_failures: AtomicU64,
}

#[derive(Default)]
pub struct HealthState {
    market: FeedHealth,
    whales: FeedHealth,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    fn feed(&self, feed: Feed) -> &FeedHealth {
        match feed {
            Feed::Market => &self.market,
            Feed::Whales => &self.whales,
        }
    }

    pub fn record_success(&self, feed: Feed) {
        let h = self.feed(feed);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        h.last_success_ns.store(now, Ordering::Relaxed);
        h.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self, feed: Feed) {
        let h = self.feed(feed);
        h.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        h.total_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_success_ns(&self, feed: Feed) -> u64 {
        self.feed(feed).last_success_ns.load(Ordering::Relaxed)
    }

    pub fn consecutive_failures(&self, feed: Feed) -> u64 {
        self.feed(feed).consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn total_failures(&self, feed: Feed) -> u64 {
        self.feed(feed).total_failures.load(Ordering::Relaxed)
    }
}
