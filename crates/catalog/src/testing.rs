//! Scriptable in-memory fetcher shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::CatalogError;
use crate::models::{League, RawListing};
use crate::upstream::{CatalogFetcher, RateLimit};

#[derive(Clone, Debug)]
pub enum Behavior {
    Listings(Vec<RawListing>),
    Delayed(Duration, Vec<RawListing>),
    HttpError(u16),
    Malformed,
}

pub struct FakeFetcher {
    categories: Mutex<HashMap<String, Behavior>>,
    rate: Mutex<Option<Decimal>>,
    rate_delay: Mutex<Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn new(rate: Option<Decimal>) -> Self {
        Self {
            categories: Mutex::new(HashMap::new()),
            rate: Mutex::new(rate),
            rate_delay: Mutex::new(Duration::ZERO),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_category(self, category: &str, behavior: Behavior) -> Self {
        self.set_category(category, behavior);
        self
    }

    pub fn set_category(&self, category: &str, behavior: Behavior) {
        self.categories
            .lock()
            .unwrap()
            .insert(category.to_string(), behavior);
    }

    pub fn set_rate(&self, rate: Option<Decimal>) {
        *self.rate.lock().unwrap() = rate;
    }

    pub fn set_rate_delay(&self, delay: Duration) {
        *self.rate_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self, category: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(category)
            .copied()
            .unwrap_or(0)
    }
}

pub fn listings(items: &[(&str, Decimal)]) -> Vec<RawListing> {
    items
        .iter()
        .map(|(name, value)| RawListing::new(*name, *value))
        .collect()
}

#[async_trait]
impl CatalogFetcher for FakeFetcher {
    fn id(&self) -> &'static str {
        "FAKE"
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60_000,
            burst: 1_000,
        }
    }

    async fn fetch_category(
        &self,
        category: &str,
        _league: &League,
    ) -> Result<Vec<RawListing>, CatalogError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(category.to_string())
            .or_insert(0) += 1;

        let behavior = self.categories.lock().unwrap().get(category).cloned();
        match behavior {
            None => Ok(Vec::new()),
            Some(Behavior::Listings(listings)) => Ok(listings),
            Some(Behavior::Delayed(delay, listings)) => {
                tokio::time::sleep(delay).await;
                Ok(listings)
            }
            Some(Behavior::HttpError(status)) => Err(CatalogError::Http {
                category: category.to_string(),
                status,
            }),
            Some(Behavior::Malformed) => Err(CatalogError::MalformedPayload {
                category: category.to_string(),
                message: "missing `lines`".to_string(),
            }),
        }
    }

    async fn fetch_reference_rate(&self, _league: &League) -> Result<Decimal, CatalogError> {
        let delay = *self.rate_delay.lock().unwrap();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
        let rate = *self.rate.lock().unwrap();
        rate.ok_or_else(|| CatalogError::ReferenceRateUnavailable("scripted failure".to_string()))
    }
}
