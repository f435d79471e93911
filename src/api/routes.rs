use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::health::HealthState;
use crate::api::latency::{LatencyStats, Percentiles};
use crate::error::AppError;
use crate::refresh::Refresher;
use crate::render::{movers_table, swap_url, whale_feed, MoversTable, WhaleFeed};
use crate::scheduler::RefreshScheduler;
use crate::state::ViewState;
use crate::types::{Feed, Selection};

#[derive(Clone)]
pub struct ApiState {
    pub view: Arc<ViewState>,
    pub refresher: Arc<Refresher>,
    pub scheduler: Arc<RefreshScheduler>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/movers", get(get_movers))
        .route("/movers/:id/trade", get(get_trade_link))
        .route("/whales", get(get_whales))
        .route("/select", post(post_select))
        .route("/refresh", post(post_refresh))
        .route("/config/refresh-interval", get(get_interval).put(put_interval))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SelectRequest {
    pub id: String,
    /// Symbol shown on the clicked row; drives the social feed lookup.
    #[serde(default)]
    pub symbol: String,
}

#[derive(Serialize)]
pub struct TradeLinkResponse {
    pub url: String,
}

#[derive(Deserialize)]
pub struct IntervalRequest {
    pub ms: u64,
}

#[derive(Serialize)]
pub struct IntervalResponse {
    pub ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct FeedHealthResponse {
    pub last_success_ns: u64,
    pub consecutive_failures: u64,
    pub total_failures: u64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub market: FeedHealthResponse,
    pub whales: FeedHealthResponse,
    pub movers: usize,
    pub whale_lines: usize,
    pub movers_updated_at_ns: u64,
    pub whales_updated_at_ns: u64,
    pub selected_id: Option<String>,
    pub refresh_ms: u64,
    pub timer_running: bool,
}

#[derive(Serialize)]
pub struct FeedLatencyResponse {
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub sample_count: u64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub market: FeedLatencyResponse,
    pub whales: FeedLatencyResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_movers(State(state): State<ApiState>) -> Json<MoversTable> {
    Json(movers_table(&state.view))
}

async fn get_whales(State(state): State<ApiState>) -> Json<WhaleFeed> {
    Json(whale_feed(&state.view))
}

async fn post_select(
    State(state): State<ApiState>,
    Json(req): Json<SelectRequest>,
) -> Json<Selection> {
    Json(state.view.select(&req.id, &req.symbol))
}

async fn get_trade_link(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<TradeLinkResponse>, AppError> {
    let address = state.view.find(&id).and_then(|p| p.token_address);
    let url = swap_url(address.as_deref())?;
    Ok(Json(TradeLinkResponse { url }))
}

async fn post_refresh(State(state): State<ApiState>) -> StatusCode {
    state.refresher.refresh_all().await;
    StatusCode::NO_CONTENT
}

async fn get_interval(State(state): State<ApiState>) -> Json<IntervalResponse> {
    Json(IntervalResponse { ms: state.scheduler.interval_ms(), previous_ms: None })
}

async fn put_interval(
    State(state): State<ApiState>,
    Json(req): Json<IntervalRequest>,
) -> Result<Json<IntervalResponse>, AppError> {
    let previous = state.scheduler.set_interval(req.ms)?;
    Ok(Json(IntervalResponse { ms: req.ms, previous_ms: Some(previous) }))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let feed = |f: Feed| FeedHealthResponse {
        last_success_ns: state.health.last_success_ns(f),
        consecutive_failures: state.health.consecutive_failures(f),
        total_failures: state.health.total_failures(f),
    };
    Json(HealthResponse {
        market: feed(Feed::Market),
        whales: feed(Feed::Whales),
        movers: state.view.snapshot().len(),
        whale_lines: state.view.whales().len(),
        movers_updated_at_ns: state.view.movers_updated_at_ns(),
        whales_updated_at_ns: state.view.whales_updated_at_ns(),
        selected_id: state.view.selected_id(),
        refresh_ms: state.scheduler.interval_ms(),
        timer_running: state.scheduler.is_running(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let to_ms = |us: Option<u64>| us.map(|v| v as f64 / 1000.0);
    let feed = |p: Percentiles| FeedLatencyResponse {
        p50_ms: to_ms(p.p50_us),
        p95_ms: to_ms(p.p95_us),
        p99_ms: to_ms(p.p99_us),
        sample_count: p.samples,
    };
    Json(LatencyResponse {
        market: feed(state.latency.percentiles(Feed::Market)),
        whales: feed(state.latency.percentiles(Feed::Whales)),
    })
}
