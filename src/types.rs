use serde::{Deserialize, Serialize};

use crate::config::{SOCIAL_HANDLES, SOCIAL_TIMELINE_BASE};

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

/// The two upstream data sources refreshed on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    Market,
    Whales,
}

// ---------------------------------------------------------------------------
// Pairs
// ---------------------------------------------------------------------------

/// A market pair after field-fallback normalization. Numeric fields are
/// always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPair {
    pub id: String,
    pub price_usd: f64,
    pub change_h1: f64,
    pub change_h24: f64,
    pub name: String,
    pub symbol: String,
    /// Dataset label for the price chart: the base token symbol, else "price".
    pub chart_label: String,
    pub token_address: Option<String>,
    pub price_history: Vec<f64>,
}

/// Up to `TOP_N` pairs ordered by `change_h1` descending.
pub type RankedSnapshot = Vec<NormalizedPair>;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Trade,
    Tx,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub symbol: String,
    pub amount: f64,
    pub kind: TxKind,
    pub tx_ref: Option<String>,
}

// ---------------------------------------------------------------------------
// Selection outputs
// ---------------------------------------------------------------------------

/// Data handed to the chart consumer: index labels and a parallel price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub label: String,
    pub labels: Vec<usize>,
    pub prices: Vec<f64>,
}

impl ChartRequest {
    pub fn from_prices(label: impl Into<String>, prices: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            labels: (0..prices.len()).collect(),
            prices,
        }
    }

    /// Zero series drawn when the selected id is no longer in the snapshot.
    pub fn placeholder() -> Self {
        Self::from_prices("price", vec![0.0])
    }
}

pub const NO_HANDLE_MESSAGE: &str = "No Twitter handle found.";

/// Input for the social timeline widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SocialFeed {
    Handle { handle: String, timeline_url: String },
    NoHandle { message: String },
}

impl SocialFeed {
    /// Static lookup only; never performs a request.
    pub fn for_symbol(symbol: &str) -> Self {
        match SOCIAL_HANDLES.iter().find(|(sym, _)| *sym == symbol) {
            Some((_, handle)) => SocialFeed::Handle {
                handle: handle.to_string(),
                timeline_url: format!("{SOCIAL_TIMELINE_BASE}{handle}"),
            },
            None => SocialFeed::NoHandle {
                message: NO_HANDLE_MESSAGE.to_string(),
            },
        }
    }
}

/// Result of a row click: the matched pair (if still present), plus the
/// chart and social derivations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub pair: Option<NormalizedPair>,
    pub chart: ChartRequest,
    pub social: SocialFeed,
}
