use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use pricecheck_catalog::{
    upstream::poe_ninja::DEFAULT_BASE_URL, CatalogConfig, ResolverConfig, DEFAULT_FALLBACK_RATE,
    DEFAULT_LEAGUES,
};
use rust_decimal::Decimal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub leagues: Vec<String>,
    pub default_league: Option<String>,
    pub catalog: CatalogConfig,
    pub resolver: ResolverConfig,
    pub upstream_base_url: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub background_refresh: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from a variable lookup. Malformed numbers fall
    /// back to their defaults; a malformed listen address is an error.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut listen_addr: SocketAddr = var("PC_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid PC_LISTEN_ADDR")?;
        if let Some(port) = parse(&var, "PORT") {
            listen_addr.set_port(port);
        }

        let leagues = list(&var, "PC_LEAGUES")
            .unwrap_or_else(|| DEFAULT_LEAGUES.iter().map(|l| l.to_string()).collect());
        let default_league = var("PC_DEFAULT_LEAGUE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let defaults = CatalogConfig::default();
        let catalog = CatalogConfig {
            ttl: seconds(&var, "PC_CACHE_TTL_SECS").unwrap_or(defaults.ttl),
            upstream_timeout: seconds(&var, "PC_UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
            refresh_wait: seconds(&var, "PC_REFRESH_WAIT_SECS").unwrap_or(defaults.refresh_wait),
            fallback_rate: parse::<Decimal, _>(&var, "PC_FALLBACK_RATE")
                .filter(|rate| *rate > Decimal::ZERO)
                .unwrap_or(DEFAULT_FALLBACK_RATE),
            snapshot_dir: Some(
                var("PC_SNAPSHOT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data")),
            ),
            ..defaults
        };

        let defaults = ResolverConfig::default();
        let resolver = ResolverConfig {
            acceptance_threshold: score(&var, "PC_ACCEPT_THRESHOLD")
                .unwrap_or(defaults.acceptance_threshold),
            short_query_threshold: score(&var, "PC_SHORT_QUERY_THRESHOLD")
                .unwrap_or(defaults.short_query_threshold),
            short_query_max_len: parse(&var, "PC_SHORT_QUERY_MAX_LEN")
                .unwrap_or(defaults.short_query_max_len),
            suggestion_threshold: score(&var, "PC_SUGGEST_THRESHOLD")
                .unwrap_or(defaults.suggestion_threshold),
            max_query_len: parse(&var, "PC_MAX_QUERY_LEN")
                .filter(|len| *len > 0)
                .unwrap_or(defaults.max_query_len),
            ..defaults
        };

        let upstream_base_url = var("PC_UPSTREAM_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let cors_allow = list(&var, "PC_CORS_ALLOW_ORIGINS").unwrap_or_else(|| vec!["*".into()]);
        let timeout_ms: u64 = parse(&var, "PC_REQUEST_TIMEOUT_MS").unwrap_or(30000);
        let background_refresh = var("PC_BACKGROUND_REFRESH")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);
        let log_format = match var("PC_LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            leagues,
            default_league,
            catalog,
            resolver,
            upstream_base_url,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            background_refresh,
            log_format,
        })
    }
}

fn parse<T, F>(var: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key).and_then(|v| v.trim().parse().ok())
}

fn seconds<F: Fn(&str) -> Option<String>>(var: &F, key: &str) -> Option<Duration> {
    parse::<u64, _>(var, key).map(Duration::from_secs)
}

fn score<F: Fn(&str) -> Option<String>>(var: &F, key: &str) -> Option<u8> {
    parse::<u8, _>(var, key).filter(|s| *s <= 100)
}

fn list<F: Fn(&str) -> Option<String>>(var: &F, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = var(key)?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}
