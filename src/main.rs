mod api;
mod config;
mod error;
mod fetcher;
mod normalizer;
mod ranking;
mod refresh;
mod render;
mod scheduler;
mod state;
mod types;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::{Config, TOP_N};
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::refresh::Refresher;
use crate::scheduler::RefreshScheduler;
use crate::state::ViewState;

// One cooperative event loop: fetches interleave, nothing runs in parallel.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());
    let view = ViewState::new();

    let fetcher = Fetcher::new(&cfg, Arc::clone(&health), Arc::clone(&latency))?;
    let refresher = Refresher::new(fetcher, Arc::clone(&view));

    // Initial refresh of both feeds fires inside start(), then every interval.
    let tick_refresher = Arc::clone(&refresher);
    let scheduler = RefreshScheduler::new(
        cfg.refresh_ms,
        Arc::new(move || tick_refresher.spawn_refresh()),
    )?;
    scheduler.start();
    info!(
        refresh_ms = cfg.refresh_ms,
        top_n = TOP_N,
        market_url = %cfg.market_url,
        tx_url = %cfg.tx_url(),
        "Refresh scheduler started",
    );

    let app = router(ApiState {
        view,
        refresher,
        scheduler,
        health,
        latency,
    });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
