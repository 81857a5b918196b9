//! Error types and retry classification for the catalog crate.
//!
//! This module provides:
//! - [`CatalogError`]: failures at the upstream/catalog boundary
//! - [`ValidationError`]: rejected user input, surfaced immediately
//! - [`PersistenceError`]: snapshot read/write failures (logged, never propagated)
//! - [`PriceCheckError`]: the outcome of a failed price check, as shown to users
//! - [`RetryClass`]: classification for circuit breaker bookkeeping

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

use crate::models::Suggestion;

/// Errors that can occur while fetching or refreshing catalog data.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The upstream call did not answer within its timeout.
    #[error("Timeout: {category}")]
    Timeout {
        /// Category (or `reference-rate`) being fetched
        category: String,
    },

    /// The upstream rate limited the request (HTTP 429).
    #[error("Rate limited: {category}")]
    RateLimited {
        /// Category (or `reference-rate`) being fetched
        category: String,
    },

    /// The upstream answered with a non-success HTTP status.
    #[error("Upstream returned HTTP {status} for {category}")]
    Http {
        /// Category (or `reference-rate`) being fetched
        category: String,
        /// Returned status code
        status: u16,
    },

    /// The upstream answered but the document is not usable.
    #[error("Malformed payload for {category}: {message}")]
    MalformedPayload {
        /// Category (or `reference-rate`) being fetched
        category: String,
        /// What was wrong with it
        message: String,
    },

    /// The circuit breaker is open for this category.
    #[error("Circuit open: {category}")]
    CircuitOpen {
        /// The category with an open circuit
        category: String,
    },

    /// The reference currency rate could not be obtained.
    #[error("Reference rate unavailable: {0}")]
    ReferenceRateUnavailable(String),

    /// Every configured category failed during a refresh.
    #[error("All {0} categories failed")]
    AllCategoriesFailed(usize),

    /// No catalog data has ever been obtained for the league.
    #[error("Catalog unavailable for league {league}")]
    Unavailable {
        /// League without any snapshot
        league: String,
    },

    /// The store does not serve this league.
    #[error("League not served: {0}")]
    UnknownLeague(String),

    /// A network error occurred while talking to the upstream.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl CatalogError {
    /// Returns the retry classification for this error.
    ///
    /// ```
    /// use pricecheck_catalog::errors::{CatalogError, RetryClass};
    ///
    /// let error = CatalogError::Timeout { category: "Currency".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithPenalty);
    ///
    /// let error = CatalogError::MalformedPayload {
    ///     category: "Oil".to_string(),
    ///     message: "missing lines".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::NextRefresh);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transport trouble - penalize the category
            Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::Http { .. }
            | Self::Network(_) => RetryClass::WithPenalty,

            // Upstream answered with junk - try again next refresh
            Self::MalformedPayload { .. } | Self::ReferenceRateUnavailable(_) => {
                RetryClass::NextRefresh
            }

            Self::CircuitOpen { .. } => RetryClass::CircuitOpen,

            // Aggregate or caller-facing outcomes, not something a single call can retry
            Self::AllCategoriesFailed(_) | Self::Unavailable { .. } | Self::UnknownLeague(_) => {
                RetryClass::Never
            }
        }
    }
}

/// Rejected user input. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: item")]
    MissingItem,

    #[error("Item name must not be empty")]
    EmptyQuery,

    #[error("Item name is too long ({length} characters, maximum is {max})")]
    QueryTooLong { length: usize, max: usize },

    #[error("Unknown league: {0}")]
    UnknownLeague(String),
}

/// Snapshot persistence failures. Logged by the store, never surfaced.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

/// Why a price check produced no price.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceCheckError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No catalog data has ever been obtained for the league.
    #[error("Price data for {league} is not available yet, try again shortly")]
    CatalogUnavailable { league: String },

    /// Nothing matched confidently, but some names came close.
    #[error("Item '{query}' not found. Did you mean: {}?", suggestion_names(.suggestions))]
    Unresolved {
        query: String,
        suggestions: Vec<Suggestion>,
    },

    #[error("Item '{query}' not found")]
    NotFound { query: String },

    /// The reference rate cannot convert the matched value.
    #[error("The divine rate for {league} is unusable, try again shortly")]
    UnusableRate { league: String },

    /// The lookup itself failed to complete.
    #[error("Price check failed: {0}")]
    Internal(String),
}

fn suggestion_names(suggestions: &[Suggestion]) -> String {
    suggestions
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
