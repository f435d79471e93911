//! Field-fallback extraction over loosely-typed upstream records.
//!
//! Every field is read through a statically enumerated chain of candidate
//! paths. A candidate is used only when it is "present" (not null, false,
//! zero, or an empty string); the chain ends in a safe default so
//! normalization never fails.

use serde_json::Value;

use crate::types::{NormalizedPair, NormalizedTransaction, TxKind};

type Chain = &'static [&'static [&'static str]];

const PAIR_ID: Chain = &[&["pairAddress"], &["pair"], &["baseToken", "address"], &["id"]];
const PAIR_PRICE: Chain = &[&["priceUsd"], &["price"]];
const PAIR_CHANGE_H1: Chain = &[&["priceChange", "h1"], &["change", "h1"]];
const PAIR_CHANGE_H24: Chain = &[&["priceChange", "h24"], &["change", "h24"]];
const PAIR_NAME: Chain = &[&["baseToken", "name"], &["name"]];
const PAIR_SYMBOL: Chain = &[&["baseToken", "symbol"], &["symbol"]];
const PAIR_CHART_LABEL: Chain = &[&["baseToken", "symbol"]];
const PAIR_TOKEN_ADDRESS: Chain = &[&["baseToken", "address"]];
const PAIR_PRICE_HISTORY: &[&str] = &["priceHistory"];

const TX_AMOUNT: Chain = &[&["amount"], &["value"], &["lamport"], &["amountSol"]];
const TX_SYMBOL: Chain = &[&["tokenSymbol"], &["symbol"], &["tokenTransfers", "0", "tokenSymbol"]];
const TX_REF: Chain = &[&["txHash"], &["signature"]];
const TX_TYPE: &[&str] = &["type"];

/// Chart dataset label when the pair has no base token symbol.
pub const DEFAULT_CHART_LABEL: &str = "price";

/// Symbol used when a transaction names no token.
pub const DEFAULT_TX_SYMBOL: &str = "SOL";

/// Normalize one raw pair record. `rank` is the record's position in the
/// current ranking pass and only feeds the synthetic id fallback.
pub fn normalize_pair(raw: &Value, rank: usize) -> NormalizedPair {
    // A price below zero is not a price.
    let price_usd = number_from(raw, PAIR_PRICE).max(0.0);

    let id = text_from(raw, PAIR_ID).unwrap_or_else(|| format!("p{rank}"));

    let price_history = lookup(raw, PAIR_PRICE_HISTORY)
        .and_then(|h| h.as_array())
        .filter(|h| !h.is_empty())
        .map(|h| h.iter().map(|p| coerce_number(Some(p))).collect())
        .unwrap_or_else(|| vec![price_usd]);

    NormalizedPair {
        id,
        price_usd,
        change_h1: change_h1_of(raw),
        change_h24: number_from(raw, PAIR_CHANGE_H24),
        name: text_from(raw, PAIR_NAME).unwrap_or_default(),
        symbol: text_from(raw, PAIR_SYMBOL).unwrap_or_default(),
        chart_label: text_from(raw, PAIR_CHART_LABEL).unwrap_or_else(|| DEFAULT_CHART_LABEL.to_string()),
        token_address: text_from(raw, PAIR_TOKEN_ADDRESS),
        price_history,
    }
}

/// Sort key used by the ranking engine before a record is fully normalized.
pub fn change_h1_of(raw: &Value) -> f64 {
    number_from(raw, PAIR_CHANGE_H1)
}

pub fn normalize_transaction(raw: &Value) -> NormalizedTransaction {
    let is_swap = lookup(raw, TX_TYPE)
        .and_then(|t| t.as_str())
        .is_some_and(|t| t.to_lowercase().contains("swap"));

    NormalizedTransaction {
        symbol: text_from(raw, TX_SYMBOL).unwrap_or_else(|| DEFAULT_TX_SYMBOL.to_string()),
        amount: number_from(raw, TX_AMOUNT),
        kind: if is_swap { TxKind::Trade } else { TxKind::Tx },
        tx_ref: text_from(raw, TX_REF),
    }
}

/// Coerce a JSON value to a finite number; anything else becomes 0.
pub fn coerce_number(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    // `+ 0.0` folds -0 into 0 so sort ties match numeric equality.
    if n.is_finite() { n + 0.0 } else { 0.0 }
}

fn number_from(raw: &Value, chain: Chain) -> f64 {
    coerce_number(first_present(raw, chain))
}

/// First present candidate in `chain` that can be read as text.
fn text_from(raw: &Value, chain: Chain) -> Option<String> {
    chain
        .iter()
        .filter_map(|path| lookup(raw, path))
        .filter(|v| is_present(v))
        .find_map(as_text)
}

fn first_present<'a>(raw: &'a Value, chain: Chain) -> Option<&'a Value> {
    chain
        .iter()
        .filter_map(|path| lookup(raw, path))
        .find(|v| is_present(v))
}

/// Walk a key path; numeric segments index into arrays.
fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |node, segment| match node {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_present(v: &Value) -> bool {
    match v {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        _ => true,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_record_falls_back_to_defaults() {
        let pair = normalize_pair(&json!({}), 3);
        assert_eq!(pair.id, "p3");
        assert_eq!(pair.price_usd, 0.0);
        assert_eq!(pair.change_h1, 0.0);
        assert_eq!(pair.change_h24, 0.0);
        assert_eq!(pair.name, "");
        assert_eq!(pair.symbol, "");
        assert_eq!(pair.chart_label, "price");
        assert_eq!(pair.token_address, None);
        assert_eq!(pair.price_history, vec![0.0]);
    }

    #[test]
    fn non_object_record_is_tolerated() {
        let pair = normalize_pair(&json!("garbage"), 0);
        assert_eq!(pair.id, "p0");
        assert_eq!(pair.price_history, vec![0.0]);
    }

    #[test]
    fn dexscreener_shape_is_extracted() {
        let raw = json!({
            "pairAddress": "PairAddr1",
            "priceUsd": "0.00001234",
            "priceChange": { "h1": 12.345678, "h24": -3.5 },
            "baseToken": { "address": "Mint1", "name": "Bonk", "symbol": "BONK" }
        });
        let pair = normalize_pair(&raw, 0);
        assert_eq!(pair.id, "PairAddr1");
        assert!((pair.price_usd - 0.000_012_34).abs() < 1e-12);
        assert_eq!(pair.change_h1, 12.345678);
        assert_eq!(pair.change_h24, -3.5);
        assert_eq!(pair.name, "Bonk");
        assert_eq!(pair.symbol, "BONK");
        assert_eq!(pair.chart_label, "BONK");
        assert_eq!(pair.token_address.as_deref(), Some("Mint1"));
        assert_eq!(pair.price_history, vec![pair.price_usd]);
    }

    #[test]
    fn alternate_field_names_are_used() {
        let raw = json!({
            "pair": "AltPair",
            "price": 2.5,
            "change": { "h1": "4.2", "h24": "1" },
            "name": "Alt",
            "symbol": "ALT"
        });
        let pair = normalize_pair(&raw, 0);
        assert_eq!(pair.id, "AltPair");
        assert_eq!(pair.price_usd, 2.5);
        assert_eq!(pair.change_h1, 4.2);
        assert_eq!(pair.change_h24, 1.0);
        assert_eq!(pair.symbol, "ALT");
        // Top-level symbol labels the row but not the chart.
        assert_eq!(pair.chart_label, "price");
        assert_eq!(pair.token_address, None);
    }

    #[test]
    fn id_chain_order_is_respected() {
        let raw = json!({ "baseToken": { "address": "Mint9" }, "id": 77 });
        assert_eq!(normalize_pair(&raw, 0).id, "Mint9");

        let raw = json!({ "id": 77 });
        assert_eq!(normalize_pair(&raw, 0).id, "77");

        let raw = json!({ "pairAddress": "", "pair": null, "id": "generic" });
        assert_eq!(normalize_pair(&raw, 0).id, "generic");
    }

    #[test]
    fn non_numeric_strings_become_zero() {
        let raw = json!({
            "priceUsd": "n/a",
            "priceChange": { "h1": "soon", "h24": {} }
        });
        let pair = normalize_pair(&raw, 1);
        assert_eq!(pair.price_usd, 0.0);
        assert_eq!(pair.change_h1, 0.0);
        assert_eq!(pair.change_h24, 0.0);
    }

    #[test]
    fn zero_primary_price_falls_through_to_secondary() {
        let raw = json!({ "priceUsd": 0, "price": "3.0" });
        assert_eq!(normalize_pair(&raw, 0).price_usd, 3.0);
    }

    #[test]
    fn missing_nested_object_uses_alternate() {
        let raw = json!({ "priceChange": null, "change": { "h1": -7.25 } });
        assert_eq!(change_h1_of(&raw), -7.25);
    }

    #[test]
    fn price_history_is_coerced() {
        let raw = json!({ "priceUsd": 1.0, "priceHistory": [1, "2.5", "x", null] });
        assert_eq!(normalize_pair(&raw, 0).price_history, vec![1.0, 2.5, 0.0, 0.0]);
    }

    #[test]
    fn empty_price_history_falls_back_to_current_price() {
        let raw = json!({ "priceUsd": 4.0, "priceHistory": [] });
        assert_eq!(normalize_pair(&raw, 0).price_history, vec![4.0]);
    }

    #[test]
    fn non_finite_values_become_zero() {
        assert_eq!(coerce_number(Some(&json!("Infinity"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("NaN"))), 0.0);
        assert!(coerce_number(Some(&json!("-0"))).is_sign_positive());
    }

    #[test]
    fn negative_price_is_clamped_to_zero() {
        let pair = normalize_pair(&json!({ "priceUsd": "-5" }), 0);
        assert_eq!(pair.price_usd, 0.0);
        assert_eq!(pair.price_history, vec![0.0]);

        let pair = normalize_pair(&json!({ "price": -0.25 }), 0);
        assert_eq!(pair.price_usd, 0.0);
    }

    #[test]
    fn transaction_defaults() {
        let tx = normalize_transaction(&json!({}));
        assert_eq!(tx.symbol, "SOL");
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.kind, TxKind::Tx);
        assert_eq!(tx.tx_ref, None);
    }

    #[test]
    fn transaction_swap_is_trade() {
        let raw = json!({
            "type": "TOKEN_SWAP",
            "value": "1500000",
            "tokenTransfers": [{ "tokenSymbol": "WIF" }],
            "signature": "5igSig"
        });
        let tx = normalize_transaction(&raw);
        assert_eq!(tx.kind, TxKind::Trade);
        assert_eq!(tx.amount, 1_500_000.0);
        assert_eq!(tx.symbol, "WIF");
        assert_eq!(tx.tx_ref.as_deref(), Some("5igSig"));
    }

    #[test]
    fn transaction_amount_chain_skips_zero() {
        let raw = json!({ "amount": 0, "lamport": 42, "txHash": "abc", "type": "transfer" });
        let tx = normalize_transaction(&raw);
        assert_eq!(tx.amount, 42.0);
        assert_eq!(tx.kind, TxKind::Tx);
        assert_eq!(tx.tx_ref.as_deref(), Some("abc"));
    }

    #[test]
    fn non_string_type_is_plain_tx() {
        let tx = normalize_transaction(&json!({ "type": 5 }));
        assert_eq!(tx.kind, TxKind::Tx);
    }
}
