//! Per-feed fetch latency histograms, in microseconds.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;

use crate::types::Feed;

/// Latency percentiles in microseconds. `None` fields mean no samples yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Percentiles {
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
    pub samples: u64,
}

pub struct LatencyStats {
    market: Mutex<Histogram<u64>>,
    whales: Mutex<Histogram<u64>>,
}

impl LatencyStats {
    /// Tracks 1us to 100s, 3 significant figures.
    pub fn new() -> Self {
        let histogram = || {
            Mutex::new(
                Histogram::new_with_bounds(1, 100_000_000, 3).expect("valid histogram bounds"),
            )
        };
        Self { market: histogram(), whales: histogram() }
    }

    fn histogram(&self, feed: Feed) -> &Mutex<Histogram<u64>> {
        match feed {
            Feed::Market => &self.market,
            Feed::Whales => &self.whales,
        }
    }

    pub fn record(&self, feed: Feed, d: Duration) {
        let us = d.as_micros().clamp(1, 100_000_000) as u64;
        if let Ok(mut h) = self.histogram(feed).lock() {
            let _ = h.record(us);
        }
    }

    pub fn percentiles(&self, feed: Feed) -> Percentiles {
        let Ok(h) = self.histogram(feed).lock() else {
            return Percentiles::default();
        };
        if h.len() == 0 {
            return Percentiles::default();
        }
        Percentiles {
            p50_us: Some(h.value_at_quantile(0.5)),
            p95_us: Some(h.value_at_quantile(0.95)),
            p99_us: Some(h.value_at_quantile(0.99)),
            samples: h.len(),
        }
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_has_no_percentiles() {
        let stats = LatencyStats::new();
        assert_eq!(stats.percentiles(Feed::Market), Percentiles::default());
    }

    #[test]
    fn feeds_are_tracked_separately() {
        let stats = LatencyStats::new();
        for ms in [10, 20, 30] {
            stats.record(Feed::Market, Duration::from_millis(ms));
        }
        let market = stats.percentiles(Feed::Market);
        assert_eq!(market.samples, 3);
        assert!(market.p99_us.unwrap() >= 29_000);
        assert_eq!(stats.percentiles(Feed::Whales).samples, 0);
    }
}
