use serde_json::Value;

use crate::config::TOP_N;
use crate::normalizer::{change_h1_of, normalize_pair};
use crate::types::RankedSnapshot;

/// Stable descending sort on a finite key, truncated to `TOP_N`.
/// Equal keys keep their input order.
pub fn rank_by<T>(mut items: Vec<T>, change_h1: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|a, b| change_h1(b).total_cmp(&change_h1(a)));
    items.truncate(TOP_N);
    items
}

/// Rank raw records by their 1h change, then normalize each at its rank
/// position so synthetic ids reflect the ranked order.
pub fn build_snapshot(raw: Vec<Value>) -> RankedSnapshot {
    rank_by(raw, change_h1_of)
        .iter()
        .enumerate()
        .map(|(rank, record)| normalize_pair(record, rank))
        .collect()
}
