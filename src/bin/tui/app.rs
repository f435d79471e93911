use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs / render.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MoversTable {
    pub rows: Vec<MoverRow>,
    pub placeholder: Option<String>,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
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
    pub token_address: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WhaleFeed {
    pub lines: Vec<WhaleLine>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhaleLine {
    pub symbol: String,
    pub kind: String,
    pub amount: String,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    pub label: String,
    pub labels: Vec<usize>,
    pub prices: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SocialFeed {
    Handle { handle: String, timeline_url: String },
    NoHandle { message: String },
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct Selection {
    pub id: String,
    pub chart: ChartRequest,
    pub social: SocialFeed,
}

#[derive(Debug, Clone, Deserialize)]
struct TradeLinkResponse {
    url: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeedHealth {
    pub consecutive_failures: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HealthResponse {
    pub market: FeedHealth,
    pub whales: FeedHealth,
    pub refresh_ms: u64,
    pub timer_running: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct IntervalResponse {
    ms: u64,
}

#[derive(Serialize)]
struct SelectRequest<'a> {
    id: &'a str,
    symbol: &'a str,
}

// ---------------------------------------------------------------------------
// Chart panel
// ---------------------------------------------------------------------------

/// A drawn chart: `(index, price)` points plus the y-range to plot.
#[derive(Debug, Clone)]
pub struct ChartInstance {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub y_bounds: [f64; 2],
}

impl ChartInstance {
    fn from_request(req: &ChartRequest) -> Self {
        let points: Vec<(f64, f64)> = req
            .labels
            .iter()
            .zip(&req.prices)
            .map(|(&x, &y)| (x as f64, y))
            .collect();
        let lo = req.prices.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = req.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let y_bounds = if lo.is_finite() && hi > lo {
            [lo, hi]
        } else {
            let v = if lo.is_finite() { lo } else { 0.0 };
            [v - 1.0, v + 1.0]
        };
        Self { label: req.label.clone(), points, y_bounds }
    }
}

/// Holds at most one live chart.
#[derive(Debug, Default)]
pub struct ChartPanel {
    current: Option<ChartInstance>,
    draws: u64,
}

impl ChartPanel {
    /// Dispose the previous chart, then build the new one.
    pub fn redraw(&mut self, req: &ChartRequest) {
        self.current.take();
        self.current = Some(ChartInstance::from_request(req));
        self.draws += 1;
    }

    pub fn current(&self) -> Option<&ChartInstance> {
        self.current.as_ref()
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

/// Refresh interval presets cycled with `+` / `-`.
pub const INTERVAL_PRESETS_MS: &[u64] = &[5_000, 15_000, 30_000, 60_000];

pub struct AppState {
    pub status: ConnectionStatus,
    pub movers: MoversTable,
    pub whales: WhaleFeed,
    pub health: HealthResponse,
    pub selection: Option<Selection>,
    pub chart: ChartPanel,
    pub interval_ms: u64,
    /// One-line notice shown in the footer (trade links, blocked trades).
    pub notice: Option<String>,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            movers: MoversTable::default(),
            whales: WhaleFeed::default(),
            health: HealthResponse::default(),
            selection: None,
            chart: ChartPanel::default(),
            interval_ms: 0,
            notice: None,
            base_url,
        }
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let movers_url = format!("{}/movers", self.base_url);
        let whales_url = format!("{}/whales", self.base_url);
        let health_url = format!("{}/health", self.base_url);

        let (movers_res, whales_res, health_res) = tokio::join!(
            client.get(&movers_url).send(),
            client.get(&whales_url).send(),
            client.get(&health_url).send(),
        );

        let (movers_res, whales_res) = match (movers_res, whales_res) {
            (Ok(m), Ok(w)) => (m, w),
            (Err(e), _) | (_, Err(e)) => {
                self.status = ConnectionStatus::Error(format!("{e}"));
                return;
            }
        };

        let (movers, whales) = tokio::join!(
            movers_res.json::<MoversTable>(),
            whales_res.json::<WhaleFeed>(),
        );

        match (movers, whales) {
            (Ok(m), Ok(w)) => {
                self.movers = m;
                self.whales = w;
                self.status = ConnectionStatus::Connected;
                // Health is optional; a missing body keeps the last values.
                if let Ok(r) = health_res {
                    if let Ok(h) = r.json::<HealthResponse>().await {
                        self.interval_ms = h.refresh_ms;
                        self.health = h;
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                self.status = ConnectionStatus::Error(format!("parse error: {e}"));
            }
        }
    }

    /// Ask the backend to refresh both feeds now, then re-read them.
    pub async fn manual_refresh(&mut self, client: &reqwest::Client) {
        let url = format!("{}/refresh", self.base_url);
        if let Err(e) = client.post(&url).send().await {
            self.status = ConnectionStatus::Error(format!("{e}"));
            return;
        }
        self.refresh(client).await;
    }

    /// Row click: redraw the chart and load the social feed for the row.
    pub async fn select(&mut self, client: &reqwest::Client, row: usize) {
        let Some(row) = self.movers.rows.get(row) else { return };
        let url = format!("{}/select", self.base_url);
        let req = SelectRequest { id: &row.id, symbol: &row.symbol };

        match client.post(&url).json(&req).send().await {
            Ok(resp) if resp.status().is_success() => {
                if let Ok(selection) = resp.json::<Selection>().await {
                    self.chart.redraw(&selection.chart);
                    self.selection = Some(selection);
                }
            }
            Ok(resp) => self.notice = Some(format!("select failed: {}", resp.status())),
            Err(e) => self.status = ConnectionStatus::Error(format!("{e}")),
        }
    }

    /// Trade action: show the swap link, or the blocking notice.
    pub async fn trade(&mut self, client: &reqwest::Client, row: usize) {
        let Some(row) = self.movers.rows.get(row) else { return };
        let Some(url) = trade_url(&self.base_url, &row.id) else {
            self.notice = Some(format!("invalid API_URL: {}", self.base_url));
            return;
        };

        self.notice = match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<TradeLinkResponse>().await {
                Ok(link) => Some(format!("Trade: {}", link.url)),
                Err(e) => Some(format!("parse error: {e}")),
            },
            Ok(resp) => {
                let status = resp.status();
                match resp.text().await {
                    Ok(text) if !text.is_empty() => Some(text),
                    _ => Some(format!("trade link unavailable ({status})")),
                }
            }
            Err(e) => Some(format!("{e}")),
        };
    }

    /// Step the refresh interval through the presets.
    pub async fn cycle_interval(&mut self, client: &reqwest::Client, up: bool) {
        let next = next_preset(self.interval_ms, up);
        let url = format!("{}/config/refresh-interval", self.base_url);
        match client.put(&url).json(&serde_json::json!({ "ms": next })).send().await {
            Ok(resp) if resp.status().is_success() => {
                if let Ok(i) = resp.json::<IntervalResponse>().await {
                    self.interval_ms = i.ms;
                    self.notice = Some(format!("Refresh interval set to {}", format_interval(i.ms)));
                }
            }
            Ok(resp) => self.notice = Some(resp.text().await.unwrap_or_default()),
            Err(e) => self.status = ConnectionStatus::Error(format!("{e}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn next_preset(current: u64, up: bool) -> u64 {
    if up {
        INTERVAL_PRESETS_MS
            .iter()
            .copied()
            .find(|&p| p > current)
            .unwrap_or(INTERVAL_PRESETS_MS[INTERVAL_PRESETS_MS.len() - 1])
    } else {
        INTERVAL_PRESETS_MS
            .iter()
            .rev()
            .copied()
            .find(|&p| p < current)
            .unwrap_or(INTERVAL_PRESETS_MS[0])
    }
}

/// `{base}/movers/{id}/trade` with `id` encoded as a single path segment.
pub fn trade_url(base_url: &str, id: &str) -> Option<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["movers", id, "trade"]);
    Some(url)
}

pub fn format_interval(ms: u64) -> String {
    if ms == 0 {
        "—".to_string()
    } else if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
