use anyhow::{ensure, Context};
use std::{net::SocketAddr, str::FromStr, time::Duration};

use flipwatch_connect::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_SHARE_API_URL};
use flipwatch_core::watchlists::WatchlistLimits;

/// Server configuration, read from `FW_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// Key of the durable watchlist record in the database.
    pub store_key: String,
    pub share_api_url: String,
    pub share_api_token: Option<String>,
    /// Base of the public share links handed back to clients.
    pub public_url: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Deadline after which an in-flight share call is cancelled.
    pub share_timeout: Duration,
    pub limits: WatchlistLimits,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: "./db/app.db".to_string(),
            store_key: "watchlists".to_string(),
            share_api_url: DEFAULT_SHARE_API_URL.to_string(),
            share_api_token: None,
            public_url: "https://flipwatch.app".to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            share_timeout: Duration::from_secs(10),
            limits: WatchlistLimits::default(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let mut limits = defaults.limits;
        if let Some(max) = parse_var("FW_MAX_WATCHLISTS")? {
            limits.max_watchlists = max;
        }
        if let Some(max) = parse_var("FW_MAX_ITEMS_PER_WATCHLIST")? {
            limits.max_items_per_watchlist = max;
        }
        if let Some(max) = parse_var("FW_MAX_NOTE_LENGTH")? {
            limits.max_note_length = max;
        }
        ensure!(
            limits.max_watchlists >= 1,
            "FW_MAX_WATCHLISTS must leave room for the default watchlist"
        );

        let cors_allow = std::env::var("FW_CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allow);

        let log_format = std::env::var("FW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            listen_addr: parse_var("FW_LISTEN_ADDR")?.unwrap_or(defaults.listen_addr),
            db_path: std::env::var("FW_DB_PATH").unwrap_or(defaults.db_path),
            store_key: std::env::var("FW_STORE_KEY").unwrap_or(defaults.store_key),
            share_api_url: std::env::var("FW_SHARE_API_URL").unwrap_or(defaults.share_api_url),
            share_api_token: std::env::var("FW_SHARE_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            public_url: std::env::var("FW_PUBLIC_URL").unwrap_or(defaults.public_url),
            cors_allow,
            request_timeout: parse_var("FW_REQUEST_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            share_timeout: parse_var("FW_SHARE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.share_timeout),
            limits,
            log_json: log_format.eq_ignore_ascii_case("json"),
        })
    }
}

fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        Err(_) => Ok(None),
    }
}
