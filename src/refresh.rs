use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join;
use tracing::{debug, info};

use crate::config::WHALE_FEED_LIMIT;
use crate::fetcher::Fetcher;
use crate::normalizer::normalize_transaction;
use crate::ranking::build_snapshot;
use crate::state::ViewState;

/// Runs the fetch → normalize → rank → store cycle for both feeds.
pub struct Refresher {
    fetcher: Fetcher,
    view: Arc<ViewState>,
}

impl Refresher {
    pub fn new(fetcher: Fetcher, view: Arc<ViewState>) -> Arc<Self> {
        Arc::new(Self { fetcher, view })
    }

    /// Timer tick entry point. Each feed runs in its own task so a slow or
    /// failing source never holds up the other, and a later tick never
    /// waits for an earlier one.
    pub fn spawn_refresh(self: &Arc<Self>) {
        let movers = Arc::clone(self);
        tokio::spawn(async move { movers.refresh_movers().await });
        let whales = Arc::clone(self);
        tokio::spawn(async move { whales.refresh_whales().await });
    }

    /// Refresh both feeds concurrently and wait for both.
    pub async fn refresh_all(&self) {
        join(self.refresh_movers(), self.refresh_whales()).await;
    }

    pub async fn refresh_movers(&self) {
        let started = Instant::now();
        let raw = self.fetcher.fetch_pairs().await;
        if raw.is_empty() {
            self.view.mark_movers_unavailable();
            info!("Movers refresh: no pairs returned");
            return;
        }

        let fetched = raw.len();
        let snapshot = build_snapshot(raw);
        let ranked = snapshot.len();
        self.view.set_snapshot(snapshot);
        info!(
            pairs = fetched,
            ranked,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Movers refresh complete: top {ranked} of {fetched} pairs",
        );
    }

    pub async fn refresh_whales(&self) {
        let started = Instant::now();
        let transactions: Vec<_> = self
            .fetcher
            .fetch_transactions()
            .await
            .iter()
            .take(WHALE_FEED_LIMIT)
            .map(normalize_transaction)
            .collect();

        debug!(
            transactions = transactions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Whale feed refresh complete",
        );
        self.view.set_whales(transactions);
    }
}
