use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::Feed;

/// Pulls raw records from the market and chain-data endpoints.
///
/// Both public fetches are infallible from the caller's point of view: any
/// transport, status, or parse failure is logged and collapsed into an empty
/// result. No timeout beyond the transport default is applied.
pub struct Fetcher {
    client: reqwest::Client,
    market_url: String,
    tx_url: String,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
}

impl Fetcher {
    pub fn new(cfg: &Config, health: Arc<HealthState>, latency: Arc<LatencyStats>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            market_url: cfg.market_url.clone(),
            tx_url: cfg.tx_url(),
            health,
            latency,
        })
    }

    /// Raw pair records found under the response's `pairs` field.
    pub async fn fetch_pairs(&self) -> Vec<Value> {
        match self.fetch_json(Feed::Market, &self.market_url).await {
            Ok(body) => {
                self.health.record_success(Feed::Market);
                pairs_from_body(body)
            }
            Err(e) => {
                warn!(url = %self.market_url, "market fetch failed: {e}");
                self.health.record_failure(Feed::Market);
                Vec::new()
            }
        }
    }

    /// Raw transaction records found under `data`, or the body itself.
    pub async fn fetch_transactions(&self) -> Vec<Value> {
        match self.fetch_json(Feed::Whales, &self.tx_url).await {
            Ok(body) => {
                self.health.record_success(Feed::Whales);
                transactions_from_body(body)
            }
            Err(e) => {
                warn!(url = %self.tx_url, "transaction fetch failed: {e}");
                self.health.record_failure(Feed::Whales);
                Vec::new()
            }
        }
    }

    async fn fetch_json(&self, feed: Feed, url: &str) -> Result<Value> {
        let started = Instant::now();
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Status { status: status.as_u16(), url: url.to_string() });
        }
        let bytes = resp.bytes().await?;
        self.latency.record(feed, started.elapsed());
        let body: Value = serde_json::from_slice(&bytes)?;
        debug!(url, ?feed, elapsed_ms = started.elapsed().as_millis() as u64, "fetched");
        Ok(body)
    }
}

pub fn pairs_from_body(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("pairs") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// `data` array first, then a top-level array body, else nothing.
pub fn transactions_from_body(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
