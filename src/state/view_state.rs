use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{ChartRequest, NormalizedPair, NormalizedTransaction, RankedSnapshot, Selection, SocialFeed};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MoversView {
    snapshot: RankedSnapshot,
    /// False when the most recent market refresh came back empty.
    available: bool,
    /// Nanosecond epoch of the last snapshot replacement (0 = never).
    updated_at_ns: u64,
}

#[derive(Debug, Default)]
struct WhalesView {
    transactions: Vec<NormalizedTransaction>,
    updated_at_ns: u64,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Current ranked snapshot, whale feed and selected pair id.
///
/// Writes are last-write-wins: a slow refresh from an older tick may
/// overwrite a newer snapshot.
#[derive(Default)]
pub struct ViewState {
    movers: RwLock<MoversView>,
    whales: RwLock<WhalesView>,
    selected: RwLock<Option<String>>,
}

impl ViewState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the stored snapshot wholesale.
    pub fn set_snapshot(&self, snapshot: RankedSnapshot) {
        let mut movers = write(&self.movers);
        movers.snapshot = snapshot;
        movers.available = true;
        movers.updated_at_ns = now_ns();
    }

    /// Record an empty market refresh. The previous snapshot stays
    /// selectable but the table renders its "no data" placeholder.
    pub fn mark_movers_unavailable(&self) {
        write(&self.movers).available = false;
    }

    pub fn snapshot(&self) -> RankedSnapshot {
        read(&self.movers).snapshot.clone()
    }

    pub fn movers_available(&self) -> bool {
        read(&self.movers).available
    }

    pub fn movers_updated_at_ns(&self) -> u64 {
        read(&self.movers).updated_at_ns
    }

    pub fn find(&self, id: &str) -> Option<NormalizedPair> {
        read(&self.movers).snapshot.iter().find(|p| p.id == id).cloned()
    }

    pub fn set_whales(&self, transactions: Vec<NormalizedTransaction>) {
        let mut whales = write(&self.whales);
        whales.transactions = transactions;
        whales.updated_at_ns = now_ns();
    }

    pub fn whales(&self) -> Vec<NormalizedTransaction> {
        read(&self.whales).transactions.clone()
    }

    pub fn whales_updated_at_ns(&self) -> u64 {
        read(&self.whales).updated_at_ns
    }

    /// Row click. Looks `id` up in the current snapshot only; a missing id
    /// yields the zero placeholder chart. The social feed is derived from
    /// the symbol shown on the clicked row.
    pub fn select(&self, id: &str, row_symbol: &str) -> Selection {
        *write(&self.selected) = Some(id.to_string());

        let pair = self.find(id);
        let chart = match &pair {
            Some(p) => ChartRequest::from_prices(p.chart_label.as_str(), p.price_history.clone()),
            None => ChartRequest::placeholder(),
        };

        Selection {
            id: id.to_string(),
            pair,
            chart,
            social: SocialFeed::for_symbol(row_symbol),
        }
    }

    pub fn selected_id(&self) -> Option<String> {
        read(&self.selected).clone()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TxKind, NO_HANDLE_MESSAGE};

    fn test_pair(id: &str, symbol: &str, history: Vec<f64>) -> NormalizedPair {
        NormalizedPair {
            id: id.to_string(),
            price_usd: history.last().copied().unwrap_or(0.0),
            change_h1: 1.0,
            change_h24: 2.0,
            name: "Test".to_string(),
            symbol: symbol.to_string(),
            chart_label: if symbol.is_empty() { "price" } else { symbol }.to_string(),
            token_address: Some("Mint".to_string()),
            price_history: history,
        }
    }

    #[test]
    fn starts_empty() {
        let view = ViewState::new();
        assert!(view.snapshot().is_empty());
        assert!(view.whales().is_empty());
        assert!(view.selected_id().is_none());
        assert!(!view.movers_available());
        assert_eq!(view.movers_updated_at_ns(), 0);
    }

    #[test]
    fn select_present_pair_draws_its_history() {
        let view = ViewState::new();
        view.set_snapshot(vec![test_pair("a", "BONK", vec![1.0, 2.0, 3.0])]);

        let selection = view.select("a", "BONK");
        assert_eq!(selection.pair.as_ref().map(|p| p.id.as_str()), Some("a"));
        assert_eq!(selection.chart.prices, vec![1.0, 2.0, 3.0]);
        assert_eq!(selection.chart.labels, vec![0, 1, 2]);
        assert_eq!(selection.chart.label, "BONK");
        assert!(matches!(selection.social, SocialFeed::Handle { ref handle, .. } if handle == "bonk_inu"));
        assert_eq!(view.selected_id().as_deref(), Some("a"));
    }

    #[test]
    fn select_missing_id_yields_zero_series() {
        let view = ViewState::new();
        view.set_snapshot(vec![test_pair("a", "BONK", vec![1.0])]);

        let selection = view.select("gone", "XYZ");
        assert!(selection.pair.is_none());
        assert_eq!(selection.chart.prices, vec![0.0]);
        assert_eq!(
            selection.social,
            SocialFeed::NoHandle { message: NO_HANDLE_MESSAGE.to_string() }
        );
    }

    #[test]
    fn stale_row_after_replacement_does_not_match() {
        let view = ViewState::new();
        view.set_snapshot(vec![test_pair("old", "DOGE", vec![5.0])]);
        view.set_snapshot(vec![test_pair("new", "PEPE", vec![6.0])]);

        let selection = view.select("old", "DOGE");
        assert!(selection.pair.is_none());
        assert_eq!(selection.chart.prices, vec![0.0]);
        // Social still follows the clicked row.
        assert!(matches!(selection.social, SocialFeed::Handle { ref handle, .. } if handle == "dogecoin"));
    }

    #[test]
    fn unlabeled_pair_charts_as_price() {
        let view = ViewState::new();
        view.set_snapshot(vec![test_pair("a", "", vec![1.0])]);
        assert_eq!(view.select("a", "").chart.label, "price");
    }

    #[test]
    fn chart_label_ignores_top_level_symbol() {
        let view = ViewState::new();
        let raw = serde_json::json!({ "pairAddress": "a", "symbol": "ALT", "priceUsd": 1.5 });
        view.set_snapshot(vec![crate::normalizer::normalize_pair(&raw, 0)]);

        let selection = view.select("a", "ALT");
        assert_eq!(selection.chart.label, "price");
        assert_eq!(selection.chart.prices, vec![1.5]);
    }

    #[test]
    fn empty_refresh_keeps_previous_snapshot_selectable() {
        let view = ViewState::new();
        view.set_snapshot(vec![test_pair("a", "BONK", vec![1.0])]);
        view.mark_movers_unavailable();

        assert!(!view.movers_available());
        assert!(view.select("a", "BONK").pair.is_some());

        view.set_snapshot(Vec::new());
        assert!(view.movers_available());
        assert!(view.snapshot().is_empty());
    }

    #[test]
    fn whales_are_replaced() {
        let view = ViewState::new();
        let tx = |s: &str| NormalizedTransaction {
            symbol: s.to_string(),
            amount: 1.0,
            kind: TxKind::Tx,
            tx_ref: None,
        };
        view.set_whales(vec![tx("SOL"), tx("WIF")]);
        view.set_whales(vec![tx("BONK")]);
        assert_eq!(view.whales(), vec![tx("BONK")]);
        assert!(view.whales_updated_at_ns() > 0);
    }
}
