//! Catalog store module.
//!
//! This module owns the shared, refreshable catalog state:
//! - The per-league snapshot state machine and single-flight refresh
//! - Snapshot persistence for cold starts
//! - Rate limiting of upstream calls
//! - Circuit breaking per category
//! - Refresh diagnostics

mod catalog_store;
mod circuit_breaker;
mod config;
mod persistence;
mod rate_limiter;
mod report;

pub use catalog_store::{CatalogState, CatalogStore, LeagueStatus};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use config::{CatalogConfig, DEFAULT_REFRESH_WAIT, DEFAULT_TTL, DEFAULT_UPSTREAM_TIMEOUT};
pub use persistence::SnapshotPersister;
pub use rate_limiter::RateLimiter;
pub use report::{CategoryAttempt, CategoryOutcome, RateOutcome, RefreshDisposition, RefreshReport};
