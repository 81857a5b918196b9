use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;

use super::CircuitBreakerConfig;
use crate::models::{DEFAULT_CATEGORIES, DEFAULT_FALLBACK_RATE};

/// Default snapshot time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Default timeout of one upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time a lookup waits for an in-flight refresh before serving stale data.
pub const DEFAULT_REFRESH_WAIT: Duration = Duration::from_secs(10);

/// Catalog store configuration.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Categories requested on every refresh, in snapshot order.
    pub categories: Vec<String>,
    pub ttl: Duration,
    pub upstream_timeout: Duration,
    pub refresh_wait: Duration,
    /// Reference rate used when the upstream never supplied one.
    pub fallback_rate: Decimal,
    /// Where snapshots are persisted; `None` disables persistence.
    pub snapshot_dir: Option<PathBuf>,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            ttl: DEFAULT_TTL,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            refresh_wait: DEFAULT_REFRESH_WAIT,
            fallback_rate: DEFAULT_FALLBACK_RATE,
            snapshot_dir: None,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}
