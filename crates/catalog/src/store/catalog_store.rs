//! The catalog store: one atomically swapped snapshot per league.
//!
//! Each league moves through four states:
//!
//! | State   | Meaning                                                     |
//! |---------|-------------------------------------------------------------|
//! | `Empty` | No snapshot has ever been loaded or fetched                 |
//! | `Cold`  | A persisted snapshot was loaded; no refresh has happened yet |
//! | `Fresh` | A refresh committed within the TTL                          |
//! | `Stale` | A snapshot exists but its TTL has lapsed (or never started) |
//!
//! Any request that finds its league in a state other than `Fresh` triggers
//! a refresh. Concurrent requests for the same league share one in-flight
//! refresh: the first acquires the league's refresh guard, the rest wait on
//! it and then read whatever that refresh committed. Waiting is bounded by
//! `refresh_wait`; a waiter that gives up is served the current snapshot
//! while the refresh carries on in its own task.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::{
    CatalogConfig, CircuitBreaker, RateLimiter, RateOutcome, RefreshDisposition, RefreshReport,
    SnapshotPersister,
};
use crate::errors::{CatalogError, RetryClass};
use crate::models::{
    CatalogSnapshot, Entity, League, LeagueRegistry, RateSource, RawListing, ReferenceRate,
};
use crate::upstream::CatalogFetcher;

/// Freshness of one league's catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogState {
    Empty,
    Cold,
    Fresh,
    Stale,
}

/// Point-in-time view of one league, for status endpoints.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueStatus {
    pub league: League,
    pub state: CatalogState,
    pub entities: usize,
    pub reference_rate: Option<Decimal>,
    pub rate_source: Option<RateSource>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    Persisted,
    Fetched,
}

#[derive(Default)]
struct Slot {
    current: Option<Arc<CatalogSnapshot>>,
    origin: Option<Origin>,
    /// Set only by a fully successful refresh. Drives the TTL.
    refreshed_at: Option<Instant>,
    /// Completed refresh attempts, successful or not.
    attempts: u64,
}

impl Slot {
    fn state(&self, ttl: Duration) -> CatalogState {
        match (&self.current, self.origin, self.refreshed_at) {
            (None, _, _) => CatalogState::Empty,
            (Some(_), _, Some(at)) if at.elapsed() < ttl => CatalogState::Fresh,
            (Some(_), Some(Origin::Persisted), None) => CatalogState::Cold,
            _ => CatalogState::Stale,
        }
    }
}

struct LeagueCache {
    slot: RwLock<Slot>,
    refresh_guard: Arc<AsyncMutex<()>>,
}

impl LeagueCache {
    fn new() -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            refresh_guard: Arc::new(AsyncMutex::new(())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(|poisoned| {
            warn!("Catalog slot lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(|poisoned| {
            warn!("Catalog slot lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

struct StoreInner {
    fetcher: Arc<dyn CatalogFetcher>,
    config: CatalogConfig,
    order: Vec<League>,
    caches: HashMap<League, LeagueCache>,
    limiter: RateLimiter,
    breaker: CircuitBreaker,
    persister: Option<SnapshotPersister>,
}

/// Shared handle to the per-league catalogs. Cheap to clone.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<StoreInner>,
}

impl CatalogStore {
    pub fn new(
        fetcher: Arc<dyn CatalogFetcher>,
        leagues: &LeagueRegistry,
        config: CatalogConfig,
    ) -> Self {
        let order = leagues.leagues().to_vec();
        let caches = order
            .iter()
            .map(|league| (league.clone(), LeagueCache::new()))
            .collect();
        let limiter = RateLimiter::new(&fetcher.rate_limit());
        let breaker = CircuitBreaker::with_config(config.circuit_breaker.clone());
        let persister = config.snapshot_dir.clone().map(SnapshotPersister::new);

        info!(
            "Catalog store using {} for {} leagues, {} categories, TTL {:?}",
            fetcher.id(),
            order.len(),
            config.categories.len(),
            config.ttl
        );

        Self {
            inner: Arc::new(StoreInner {
                fetcher,
                config,
                order,
                caches,
                limiter,
                breaker,
                persister,
            }),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    /// Leagues this store holds, in registry order.
    pub fn leagues(&self) -> &[League] {
        &self.inner.order
    }

    /// Load persisted snapshots for every league still `Empty`.
    ///
    /// Unreadable files are logged and skipped. Returns how many leagues
    /// were seeded.
    pub async fn load_persisted(&self) -> usize {
        let Some(persister) = &self.inner.persister else {
            return 0;
        };

        let mut loaded = 0;
        for league in &self.inner.order {
            let snapshot = match persister.load(league).await {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => {
                    debug!("No persisted catalog for '{}'", league);
                    continue;
                }
                Err(e) => {
                    warn!("Ignoring persisted catalog for '{}': {}", league, e);
                    continue;
                }
            };

            let Some(cache) = self.inner.caches.get(league) else {
                continue;
            };
            let mut slot = cache.write();
            if slot.current.is_none() {
                info!(
                    "Loaded persisted catalog for '{}' ({} entities, fetched {})",
                    league,
                    snapshot.len(),
                    snapshot.fetched_at()
                );
                slot.current = Some(Arc::new(snapshot));
                slot.origin = Some(Origin::Persisted);
                loaded += 1;
            }
        }
        loaded
    }

    /// Return a usable snapshot for `league`, refreshing first unless it is fresh.
    ///
    /// Fails with [`CatalogError::Unavailable`] only when no snapshot exists
    /// after the refresh (or after `refresh_wait` elapses).
    pub async fn get_snapshot(&self, league: &League) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        let cache = self.inner.cache(league)?;
        let (state, attempts_seen) = {
            let slot = cache.read();
            let state = slot.state(self.inner.config.ttl);
            if state == CatalogState::Fresh {
                if let Some(current) = &slot.current {
                    return Ok(Arc::clone(current));
                }
            }
            (state, slot.attempts)
        };

        debug!("Catalog for '{}' is {:?}, refreshing", league, state);
        let wait = self.inner.config.refresh_wait;
        if tokio::time::timeout(wait, self.refresh_after(league, attempts_seen))
            .await
            .is_err()
        {
            warn!(
                "Refresh of '{}' still running after {:?}, serving current catalog",
                league, wait
            );
        }

        cache
            .read()
            .current
            .clone()
            .ok_or_else(|| CatalogError::Unavailable {
                league: league.to_string(),
            })
    }

    /// Refresh `league` now, after any in-flight refresh finishes.
    pub async fn refresh(&self, league: &League) -> Result<RefreshReport, CatalogError> {
        let cache = self.inner.cache(league)?;
        let _guard = cache.refresh_guard.lock().await;
        Ok(self.inner.run_refresh(league, cache).await)
    }

    pub fn state(&self, league: &League) -> CatalogState {
        self.inner
            .caches
            .get(league)
            .map(|cache| cache.read().state(self.inner.config.ttl))
            .unwrap_or(CatalogState::Empty)
    }

    /// The current snapshot without triggering a refresh.
    pub fn current(&self, league: &League) -> Option<Arc<CatalogSnapshot>> {
        self.inner
            .caches
            .get(league)
            .and_then(|cache| cache.read().current.clone())
    }

    /// The league's reference rate, or the configured fallback when no
    /// snapshot exists.
    pub fn reference_rate(&self, league: &League) -> ReferenceRate {
        self.current(league)
            .map(|snapshot| snapshot.reference_rate())
            .unwrap_or_else(|| ReferenceRate::fallback(self.inner.config.fallback_rate))
    }

    pub fn status(&self) -> Vec<LeagueStatus> {
        self.inner
            .order
            .iter()
            .map(|league| {
                let snapshot = self.current(league);
                LeagueStatus {
                    league: league.clone(),
                    state: self.state(league),
                    entities: snapshot.as_ref().map_or(0, |s| s.len()),
                    reference_rate: snapshot.as_ref().map(|s| s.reference_rate().value()),
                    rate_source: snapshot.as_ref().map(|s| s.reference_rate().source()),
                    fetched_at: snapshot.as_ref().map(|s| s.fetched_at()),
                }
            })
            .collect()
    }

    /// Take the refresh guard and refresh, unless another refresh completed
    /// since the caller looked at the slot.
    async fn refresh_after(&self, league: &League, attempts_seen: u64) {
        let Ok(cache) = self.inner.cache(league) else {
            return;
        };
        let guard = Arc::clone(&cache.refresh_guard).lock_owned().await;
        if cache.read().attempts != attempts_seen {
            debug!("Joined a completed refresh of '{}'", league);
            return;
        }
        self.spawn_refresh(league.clone(), guard).await;
    }

    /// Run the refresh in its own task so it completes even when the
    /// requesting caller stops waiting.
    async fn spawn_refresh(&self, league: League, guard: OwnedMutexGuard<()>) {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _guard = guard;
            if let Ok(cache) = inner.cache(&league) {
                inner.run_refresh(&league, cache).await;
            }
        });
        if let Err(e) = task.await {
            warn!("Catalog refresh task failed: {}", e);
        }
    }
}

impl StoreInner {
    fn cache(&self, league: &League) -> Result<&LeagueCache, CatalogError> {
        self.caches
            .get(league)
            .ok_or_else(|| CatalogError::UnknownLeague(league.to_string()))
    }

    async fn run_refresh(&self, league: &League, cache: &LeagueCache) -> RefreshReport {
        let started = Instant::now();
        let mut report = RefreshReport::new(league.clone());

        let results = join_all(
            self.config
                .categories
                .iter()
                .map(|category| self.fetch_category(league, category)),
        )
        .await;

        let mut entities = Vec::new();
        for (category, result) in self.config.categories.iter().zip(results) {
            match result {
                Ok(listings) => {
                    report.record_fetched(category, listings.len());
                    entities.extend(
                        listings
                            .into_iter()
                            .map(|l| Entity::new(l.name, l.value, category.as_str())),
                    );
                }
                Err(CatalogError::CircuitOpen { .. }) => report.record_circuit_open(category),
                Err(e) => {
                    warn!("Skipping '{}' for '{}': {}", category, league, e);
                    report.record_failed(category, e.to_string());
                }
            }
        }

        if report.fetched_count() == 0 {
            warn!(
                "Refresh of '{}' failed, keeping previous catalog: {}",
                league,
                CatalogError::AllCategoriesFailed(report.attempts.len())
            );
            cache.write().attempts += 1;
            return report;
        }

        let rate = match self.fetch_rate(league).await {
            Ok(rate) => {
                report.rate = RateOutcome::Fetched(rate.value());
                Some(rate)
            }
            Err(e) => {
                warn!("Reference rate for '{}' unavailable: {}", league, e);
                report.rate = RateOutcome::Failed {
                    error: e.to_string(),
                };
                None
            }
        };

        let has_previous = cache.read().current.is_some();
        let (rate, disposition) = match rate {
            Some(rate) => (rate, RefreshDisposition::Committed),
            None if has_previous => {
                cache.write().attempts += 1;
                info!("Refresh of '{}' retained previous catalog: {}", league, report.summary());
                return report;
            }
            None => (
                ReferenceRate::fallback(self.config.fallback_rate),
                RefreshDisposition::CommittedWithFallbackRate,
            ),
        };

        let snapshot = Arc::new(CatalogSnapshot::new(
            league.clone(),
            entities,
            rate,
            Utc::now(),
        ));
        {
            let mut slot = cache.write();
            slot.current = Some(Arc::clone(&snapshot));
            slot.origin = Some(Origin::Fetched);
            slot.refreshed_at =
                (disposition == RefreshDisposition::Committed).then(Instant::now);
            slot.attempts += 1;
        }
        report.disposition = disposition;
        info!(
            "Refreshed '{}' in {:?}: {}",
            league,
            started.elapsed(),
            report.summary()
        );

        if let Some(persister) = &self.persister {
            if let Err(e) = persister.save(&snapshot).await {
                warn!("Failed to persist catalog for '{}': {}", league, e);
            }
        }
        report
    }

    async fn fetch_category(
        &self,
        league: &League,
        category: &str,
    ) -> Result<Vec<RawListing>, CatalogError> {
        let key = format!("{}/{}", league, category);
        if !self.breaker.is_allowed(&key) {
            debug!("Circuit open for '{}', skipping", key);
            return Err(CatalogError::CircuitOpen {
                category: category.to_string(),
            });
        }

        self.limiter.acquire().await;
        let result = match tokio::time::timeout(
            self.config.upstream_timeout,
            self.fetcher.fetch_category(category, league),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CatalogError::Timeout {
                category: category.to_string(),
            }),
        };

        match &result {
            Ok(listings) => {
                debug!("Fetched {} listings for '{}'", listings.len(), key);
                self.breaker.record_success(&key);
            }
            Err(e) if e.retry_class() == RetryClass::WithPenalty => {
                self.breaker.record_failure(&key);
            }
            Err(_) => {}
        }
        result
    }

    async fn fetch_rate(&self, league: &League) -> Result<ReferenceRate, CatalogError> {
        self.limiter.acquire().await;
        let value = match tokio::time::timeout(
            self.config.upstream_timeout,
            self.fetcher.fetch_reference_rate(league),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(CatalogError::Timeout {
                    category: "reference-rate".to_string(),
                })
            }
        };
        ReferenceRate::upstream(value).ok_or_else(|| {
            CatalogError::ReferenceRateUnavailable(format!("non-positive rate {}", value))
        })
    }
}
