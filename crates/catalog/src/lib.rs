//! Pricecheck Catalog Crate
//!
//! Caches a remote item-price feed per league and resolves noisy item names
//! against it.
//!
//! # Overview
//!
//! - Aggregates many unreliable per-category upstream fetches into one
//!   consistent in-memory snapshot per league
//! - TTL-driven, single-flight refresh with per-category timeouts, rate
//!   limiting and circuit breaking
//! - Disk-backed snapshots for cold starts
//! - Text normalization and fuzzy scoring with tunable thresholds
//! - Layered resolution: exact match, fuzzy match, suggestions, not found
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! | PriceCheckService| --> |   CatalogStore   | --> |  CatalogFetcher  |  (poe.ninja)
//! +------------------+     +------------------+     +------------------+
//!          |                        |
//!          v                        v
//! +------------------+     +------------------+
//! |    resolver      |     | SnapshotPersister|  (JSON on disk)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |      text        |  (normalize, weighted ratio)
//! +------------------+
//! ```

pub mod errors;
pub mod models;
pub mod pricing;
pub mod resolver;
pub mod store;
pub mod text;
pub mod upstream;

#[cfg(test)]
mod testing;

pub use errors::{CatalogError, PersistenceError, PriceCheckError, RetryClass, ValidationError};
pub use models::{
    CatalogSnapshot, Category, Entity, League, LeagueRegistry, MatchedEntity, RateSource,
    RawListing, ReferenceRate, Resolution, Suggestion, DEFAULT_CATEGORIES, DEFAULT_FALLBACK_RATE,
    DEFAULT_LEAGUES,
};
pub use pricing::{round_value, PriceCheck, PriceCheckService, PriceCheckServiceTrait};
pub use resolver::{resolve, validate_query, ResolverConfig};
pub use store::{
    CatalogConfig, CatalogState, CatalogStore, CircuitBreakerConfig, LeagueStatus,
    RefreshDisposition, RefreshReport,
};
pub use upstream::poe_ninja::PoeNinjaFetcher;
pub use upstream::{CatalogFetcher, RateLimit};
