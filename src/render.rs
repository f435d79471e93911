//! Display adapter between the view state and the render surface.
//! Everything here is formatting; no ranking or fetching.

use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

use crate::config::{EXPLORER_URL_BASE, SWAP_URL_BASE};
use crate::error::{AppError, Result};
use crate::state::ViewState;
use crate::types::{NormalizedPair, NormalizedTransaction, TxKind};

pub const NO_MOVERS_MESSAGE: &str = "No data";
pub const NO_WHALES_MESSAGE: &str = "No recent whale transactions found.";

// ---------------------------------------------------------------------------
// Rendered shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverRow {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: String,
    pub change_h1: String,
    pub change_h1_up: bool,
    pub change_h24: String,
    pub change_h24_up: bool,
    /// Empty when the pair carries no token address.
    pub token_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoversTable {
    pub rows: Vec<MoverRow>,
    pub placeholder: Option<String>,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleLine {
    pub symbol: String,
    pub kind: TxKind,
    pub amount: String,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleFeed {
    pub lines: Vec<WhaleLine>,
    pub placeholder: Option<String>,
}

pub fn movers_table(view: &ViewState) -> MoversTable {
    let snapshot = view.snapshot();
    let updated = view.movers_updated_at_ns();
    let last_update = (updated > 0).then(|| format_time_ns(updated));

    if !view.movers_available() || snapshot.is_empty() {
        return MoversTable {
            rows: Vec::new(),
            placeholder: Some(NO_MOVERS_MESSAGE.to_string()),
            last_update,
        };
    }

    MoversTable {
        rows: snapshot.iter().enumerate().map(|(i, p)| mover_row(i, p)).collect(),
        placeholder: None,
        last_update,
    }
}

pub fn whale_feed(view: &ViewState) -> WhaleFeed {
    let lines: Vec<WhaleLine> = view.whales().iter().map(whale_line).collect();
    let placeholder = lines.is_empty().then(|| NO_WHALES_MESSAGE.to_string());
    WhaleFeed { lines, placeholder }
}

fn mover_row(index: usize, p: &NormalizedPair) -> MoverRow {
    MoverRow {
        rank: index + 1,
        id: p.id.clone(),
        name: p.name.clone(),
        symbol: p.symbol.clone(),
        price: format_price(p.price_usd),
        change_h1: format_change(p.change_h1),
        change_h1_up: is_up(p.change_h1),
        change_h24: format_change(p.change_h24),
        change_h24_up: is_up(p.change_h24),
        token_address: p.token_address.clone().unwrap_or_default(),
    }
}

fn whale_line(tx: &NormalizedTransaction) -> WhaleLine {
    WhaleLine {
        symbol: tx.symbol.clone(),
        kind: tx.kind,
        amount: format_amount(tx.amount),
        explorer_url: explorer_url(tx.tx_ref.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// Outbound links
// ---------------------------------------------------------------------------

/// Swap page for a token. A missing or empty address blocks the action.
pub fn swap_url(token_address: Option<&str>) -> Result<String> {
    match token_address {
        Some(addr) if !addr.is_empty() => Ok(format!("{SWAP_URL_BASE}{addr}")),
        _ => Err(AppError::TradeUnavailable),
    }
}

pub fn explorer_url(tx_ref: Option<&str>) -> Option<String> {
    tx_ref.filter(|r| !r.is_empty()).map(|r| format!("{EXPLORER_URL_BASE}{r}"))
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_price(v: f64) -> String {
    format!("${v:.6}")
}

/// Two decimals for display; sorting uses the unrounded value.
pub fn format_change(v: f64) -> String {
    format!("{v:.2}%")
}

/// Sign of the value as displayed, so "-0.00" counts as up.
fn is_up(v: f64) -> bool {
    (v * 100.0).round() / 100.0 >= 0.0
}

pub fn format_amount(n: f64) -> String {
    if n > 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if n > 1e3 {
        format!("{:.1}k", n / 1e3)
    } else {
        group_thousands(n)
    }
}

/// At most three fraction digits, comma-grouped integer part.
fn group_thousands(n: f64) -> String {
    let fixed = format!("{:.3}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac = frac_part.trim_end_matches('0');

    let grouped = int_part
        .parse::<u64>()
        .map(|i| i.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    let sign = if n < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Convert nanosecond epoch timestamp to HH:MM:SS string (UTC).
pub fn format_time_ns(ns: u64) -> String {
    let secs = ns / 1_000_000_000;
    let h = (secs / 3600) % 24;
    let m = (secs / 60) % 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(id: &str, change_h1: f64, token_address: Option<&str>) -> NormalizedPair {
        NormalizedPair {
            id: id.to_string(),
            price_usd: 0.000_012_345_6,
            change_h1,
            change_h24: -1.234,
            name: "Bonk".to_string(),
            symbol: "BONK".to_string(),
            chart_label: "BONK".to_string(),
            token_address: token_address.map(str::to_string),
            price_history: vec![0.0],
        }
    }

    #[test]
    fn empty_view_renders_no_data() {
        let view = ViewState::new();
        let table = movers_table(&view);
        assert!(table.rows.is_empty());
        assert_eq!(table.placeholder.as_deref(), Some("No data"));
        assert!(table.last_update.is_none());

        let feed = whale_feed(&view);
        assert_eq!(feed.placeholder.as_deref(), Some("No recent whale transactions found."));
    }

    #[test]
    fn rows_are_formatted() {
        let view = ViewState::new();
        view.set_snapshot(vec![pair("a", 12.345_678, Some("Mint")), pair("b", -0.004, None)]);

        let table = movers_table(&view);
        assert!(table.placeholder.is_none());
        assert!(table.last_update.is_some());

        let first = &table.rows[0];
        assert_eq!(first.rank, 1);
        assert_eq!(first.price, "$0.000012");
        assert_eq!(first.change_h1, "12.35%");
        assert!(first.change_h1_up);
        assert_eq!(first.change_h24, "-1.23%");
        assert!(!first.change_h24_up);
        assert_eq!(first.token_address, "Mint");

        let second = &table.rows[1];
        assert_eq!(second.rank, 2);
        assert_eq!(second.change_h1, "-0.00%");
        assert!(second.change_h1_up);
        assert_eq!(second.token_address, "");
    }

    #[test]
    fn unavailable_movers_render_placeholder() {
        let view = ViewState::new();
        view.set_snapshot(vec![pair("a", 1.0, None)]);
        view.mark_movers_unavailable();
        assert_eq!(movers_table(&view).placeholder.as_deref(), Some("No data"));
    }

    #[test]
    fn swap_url_requires_address() {
        assert_eq!(swap_url(Some("Mint1")).unwrap(), "https://jup.ag/swap/SOL-Mint1");
        assert!(matches!(swap_url(Some("")), Err(AppError::TradeUnavailable)));
        assert!(matches!(swap_url(None), Err(AppError::TradeUnavailable)));
    }

    #[test]
    fn explorer_url_uses_tx_ref() {
        assert_eq!(explorer_url(Some("sig")).as_deref(), Some("https://solscan.io/tx/sig"));
        assert_eq!(explorer_url(None), None);
    }

    #[test]
    fn amounts_are_abbreviated() {
        assert_eq!(format_amount(2_500_000.0), "2.5M");
        assert_eq!(format_amount(1_500.0), "1.5k");
        assert_eq!(format_amount(1_000.0), "1,000");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(0.123_456), "0.123");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(-5_000.0), "-5,000");
        assert_eq!(format_amount(-1_234_567.25), "-1,234,567.25");
        assert_eq!(format_amount(-0.0001), "0");
    }

    #[test]
    fn time_is_hh_mm_ss() {
        assert_eq!(format_time_ns(3_723 * 1_000_000_000), "01:02:03");
    }
}
