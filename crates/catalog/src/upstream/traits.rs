//! Upstream fetcher trait definition.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::RateLimit;
use crate::errors::CatalogError;
use crate::models::{League, RawListing};

/// Trait for upstream catalog feeds.
///
/// Implement this trait to add support for a new price feed. The catalog
/// store calls it once per configured category during a refresh, plus once
/// for the reference rate.
///
/// # Contract
///
/// - A category with zero listings is `Ok(vec![])`, not an error.
/// - Malformed entries inside an otherwise valid document are skipped by the
///   implementation, not reported.
/// - Timeouts are applied by the caller; implementations may add their own.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pricecheck_catalog::errors::CatalogError;
/// use pricecheck_catalog::models::{League, RawListing};
/// use pricecheck_catalog::upstream::CatalogFetcher;
/// use rust_decimal::Decimal;
///
/// struct StaticFeed;
///
/// #[async_trait]
/// impl CatalogFetcher for StaticFeed {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     async fn fetch_category(&self, category: &str, league: &League)
///         -> Result<Vec<RawListing>, CatalogError> {
///         Ok(vec![])
///     }
///
///     async fn fetch_reference_rate(&self, league: &League) -> Result<Decimal, CatalogError> {
///         Ok(Decimal::ONE_HUNDRED)
///     }
/// }
/// ```
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Unique identifier, used for logging and rate limiting.
    fn id(&self) -> &'static str;

    /// Rate limits the store applies when calling this feed.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Fetch every listing of one category in one league.
    async fn fetch_category(
        &self,
        category: &str,
        league: &League,
    ) -> Result<Vec<RawListing>, CatalogError>;

    /// Fetch the base-unit value of one premium currency unit.
    async fn fetch_reference_rate(&self, league: &League) -> Result<Decimal, CatalogError>;
}
