//! poe.ninja price feed.
//!
//! Endpoints used:
//! - `{base}/itemoverview?league=<league>&type=<category>` for listings
//! - `{base}/currencyoverview?league=<league>&type=Currency` for the divine orb rate
//!
//! The feed is slow and occasionally returns partial documents, so parsing is
//! lenient per line and strict per document.

mod models;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

use crate::errors::CatalogError;
use crate::models::{League, RawListing};
use crate::upstream::{CatalogFetcher, RateLimit};

use models::{CurrencyLine, ItemLine, OverviewResponse};

/// Provider ID constant
const PROVIDER_ID: &str = "POE_NINJA";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://poe.ninja/api/data";

/// Currency whose chaos equivalent is the reference rate.
const REFERENCE_CURRENCY: &str = "Divine Orb";

/// Label used in errors about the reference rate request.
const REFERENCE_RATE_LABEL: &str = "reference-rate";

/// Transport-level timeout; the store applies a tighter per-call timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// poe.ninja catalog fetcher.
///
/// # Example
///
/// ```ignore
/// use pricecheck_catalog::upstream::poe_ninja::PoeNinjaFetcher;
///
/// let fetcher = PoeNinjaFetcher::new();
/// ```
pub struct PoeNinjaFetcher {
    client: Client,
    base_url: String,
}

impl PoeNinjaFetcher {
    /// Create a fetcher against the public API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a fetcher against another API root (mirrors, test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pricecheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn item_overview_url(&self, category: &str, league: &League) -> String {
        format!(
            "{}/itemoverview?league={}&type={}",
            self.base_url,
            urlencoding::encode(league.as_str()),
            urlencoding::encode(category)
        )
    }

    fn currency_overview_url(&self, league: &League) -> String {
        format!(
            "{}/currencyoverview?league={}&type=Currency",
            self.base_url,
            urlencoding::encode(league.as_str())
        )
    }

    /// GET a document and return its body, mapping transport failures.
    async fn get_body(&self, url: &str, label: &str) -> Result<String, CatalogError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout {
                    category: label.to_string(),
                }
            } else {
                CatalogError::Network(e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited {
                category: label.to_string(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::Http {
                category: label.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

impl Default for PoeNinjaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn malformed(category: &str, message: impl Into<String>) -> CatalogError {
    CatalogError::MalformedPayload {
        category: category.to_string(),
        message: message.into(),
    }
}

/// Parse an `itemoverview` document into listings.
///
/// A document without `lines` is malformed. Individual lines lacking a name
/// or a finite, non-negative `chaosValue` are skipped.
pub fn parse_item_overview(category: &str, body: &str) -> Result<Vec<RawListing>, CatalogError> {
    let response: OverviewResponse =
        serde_json::from_str(body).map_err(|e| malformed(category, e.to_string()))?;
    let lines = response
        .lines
        .ok_or_else(|| malformed(category, "missing `lines`"))?;

    let total = lines.len();
    let listings: Vec<RawListing> = lines
        .into_iter()
        .filter_map(|line| serde_json::from_value::<ItemLine>(line).ok())
        .filter(|line| !line.name.trim().is_empty())
        .filter(|line| line.chaos_value.is_finite() && line.chaos_value >= 0.0)
        .filter_map(|line| {
            Decimal::try_from(line.chaos_value)
                .ok()
                .map(|value| RawListing::new(line.name, value))
        })
        .collect();

    if listings.len() < total {
        debug!(
            "Skipped {} malformed lines in category '{}'",
            total - listings.len(),
            category
        );
    }

    Ok(listings)
}

/// Parse a `currencyoverview` document and extract the divine orb rate.
pub fn parse_reference_rate(body: &str) -> Result<Decimal, CatalogError> {
    let response: OverviewResponse = serde_json::from_str(body)
        .map_err(|e| CatalogError::ReferenceRateUnavailable(e.to_string()))?;
    let lines = response.lines.ok_or_else(|| {
        CatalogError::ReferenceRateUnavailable("missing `lines`".to_string())
    })?;

    let rate = lines
        .into_iter()
        .filter_map(|line| serde_json::from_value::<CurrencyLine>(line).ok())
        .find(|line| line.currency_type_name == REFERENCE_CURRENCY)
        .and_then(|line| line.chaos_equivalent)
        .ok_or_else(|| {
            CatalogError::ReferenceRateUnavailable(format!("no '{}' line", REFERENCE_CURRENCY))
        })?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(CatalogError::ReferenceRateUnavailable(format!(
            "invalid rate {}",
            rate
        )));
    }

    Decimal::try_from(rate)
        .map_err(|e| CatalogError::ReferenceRateUnavailable(e.to_string()))
}

#[async_trait]
impl CatalogFetcher for PoeNinjaFetcher {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 120,
            burst: 30,
        }
    }

    async fn fetch_category(
        &self,
        category: &str,
        league: &League,
    ) -> Result<Vec<RawListing>, CatalogError> {
        let url = self.item_overview_url(category, league);
        let body = self.get_body(&url, category).await?;
        parse_item_overview(category, &body)
    }

    async fn fetch_reference_rate(&self, league: &League) -> Result<Decimal, CatalogError> {
        let url = self.currency_overview_url(league);
        let body = self.get_body(&url, REFERENCE_RATE_LABEL).await?;
        parse_reference_rate(&body)
    }
}
