use crate::error::{AppError, Result};

/// DexScreener Solana pairs, routed through the public CORS proxy.
pub const MARKET_URL: &str = "https://solememe23.benjamin-zolota.workers.dev?url=https://api.dexscreener.io/latest/dex/tokens/solana/";
/// Solscan public transaction endpoint (no API key).
pub const TX_API_URL: &str = "https://public-api.solscan.io/transaction";

/// Number of movers kept per ranked snapshot.
pub const TOP_N: usize = 10;

/// Page size requested from the transaction endpoint.
pub const TX_PAGE_SIZE: usize = 20;

/// Maximum whale lines rendered per refresh.
pub const WHALE_FEED_LIMIT: usize = 20;

/// Refresh interval used when REFRESH_MS is unset (milliseconds).
pub const DEFAULT_REFRESH_MS: u64 = 30_000;

pub const SWAP_URL_BASE: &str = "https://jup.ag/swap/SOL-";
pub const EXPLORER_URL_BASE: &str = "https://solscan.io/tx/";
pub const SOCIAL_TIMELINE_BASE: &str = "https://twitter.com/";

/// Static symbol → social handle mapping for the token feed panel.
pub const SOCIAL_HANDLES: &[(&str, &str)] = &[
    ("BONK", "bonk_inu"),
    ("PEPE", "pepecoin"),
    ("SHIB", "Shibtoken"),
    ("DOGE", "dogecoin"),
    ("FLOKI", "RealFlokiInu"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub market_url: String,
    pub tx_api_url: String,
    pub log_level: String,
    pub api_port: u16,
    /// Initial scheduler period in milliseconds (REFRESH_MS)
    pub refresh_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let refresh_ms = std::env::var("REFRESH_MS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_MS.to_string())
            .parse::<u64>()
            .map_err(|_| AppError::Config("REFRESH_MS must be a positive integer".to_string()))?;
        if refresh_ms == 0 {
            return Err(AppError::Config("REFRESH_MS must be a positive integer".to_string()));
        }

        Ok(Self {
            market_url: std::env::var("MARKET_URL").unwrap_or_else(|_| MARKET_URL.to_string()),
            tx_api_url: std::env::var("TX_API_URL").unwrap_or_else(|_| TX_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            refresh_ms,
        })
    }

    /// Full transaction feed URL with the fixed page size applied.
    pub fn tx_url(&self) -> String {
        format!("{}?limit={}", self.tx_api_url, TX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_url_appends_page_size() {
        let cfg = Config {
            market_url: MARKET_URL.to_string(),
            tx_api_url: TX_API_URL.to_string(),
            log_level: "info".to_string(),
            api_port: 3000,
            refresh_ms: DEFAULT_REFRESH_MS,
        };
        assert_eq!(cfg.tx_url(), "https://public-api.solscan.io/transaction?limit=20");
    }
}
