use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{PriceCheck, PriceCheckServiceTrait};
use crate::errors::{CatalogError, PriceCheckError, ValidationError};
use crate::models::{League, LeagueRegistry, Resolution};
use crate::resolver::{resolve, validate_query, ResolverConfig};
use crate::store::{CatalogStore, LeagueStatus};

/// Price checks backed by a [`CatalogStore`].
pub struct PriceCheckService {
    store: CatalogStore,
    leagues: LeagueRegistry,
    resolver: ResolverConfig,
}

impl PriceCheckService {
    pub fn new(store: CatalogStore, leagues: LeagueRegistry, resolver: ResolverConfig) -> Self {
        Self {
            store,
            leagues,
            resolver,
        }
    }
}

fn catalog_failure(error: CatalogError, league: &League) -> PriceCheckError {
    match error {
        CatalogError::UnknownLeague(name) => ValidationError::UnknownLeague(name).into(),
        CatalogError::Unavailable { .. } => PriceCheckError::CatalogUnavailable {
            league: league.to_string(),
        },
        other => {
            warn!("Unexpected catalog failure for '{}': {}", league, other);
            PriceCheckError::CatalogUnavailable {
                league: league.to_string(),
            }
        }
    }
}

#[async_trait]
impl PriceCheckServiceTrait for PriceCheckService {
    fn leagues(&self) -> &LeagueRegistry {
        &self.leagues
    }

    async fn price_check(
        &self,
        item: &str,
        league: Option<&str>,
    ) -> Result<PriceCheck, PriceCheckError> {
        // Reject bad input before anything reaches the upstream.
        let league = self.leagues.resolve(league)?;
        validate_query(item, &self.resolver)?;

        let snapshot = self
            .store
            .get_snapshot(&league)
            .await
            .map_err(|e| catalog_failure(e, &league))?;

        // scoring walks the whole catalog, so keep it off the async workers
        let resolution = {
            let snapshot = Arc::clone(&snapshot);
            let resolver = self.resolver.clone();
            let query = item.to_string();
            tokio::task::spawn_blocking(move || resolve(&query, &snapshot, &resolver))
                .await
                .map_err(|e| {
                    warn!("Resolver task for '{}' failed: {}", item, e);
                    PriceCheckError::Internal(e.to_string())
                })??
        };

        match resolution {
            Resolution::Matched(matched) => {
                debug!(
                    "Price check '{}' in '{}' matched '{}' (score {})",
                    item,
                    league,
                    matched.entity.name(),
                    matched.score
                );
                PriceCheck::new(item, &matched, snapshot.reference_rate(), league)
            }
            Resolution::Unresolved(suggestions) => Err(PriceCheckError::Unresolved {
                query: item.trim().to_string(),
                suggestions,
            }),
            Resolution::NotFound => Err(PriceCheckError::NotFound {
                query: item.trim().to_string(),
            }),
        }
    }

    fn status(&self) -> Vec<LeagueStatus> {
        self.store.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Suggestion;
    use crate::store::CatalogConfig;
    use crate::testing::{listings, Behavior, FakeFetcher};
    use rust_decimal_macros::dec;

    fn service(fetcher: Arc<FakeFetcher>) -> PriceCheckService {
        let leagues = LeagueRegistry::new(["Mercenaries", "Standard"], Some("Mercenaries"));
        let config = CatalogConfig {
            categories: vec!["UniqueAccessory".to_string(), "Currency".to_string()],
            ..CatalogConfig::default()
        };
        let store = CatalogStore::new(fetcher, &leagues, config);
        PriceCheckService::new(store, leagues, ResolverConfig::default())
    }

    fn fetcher() -> Arc<FakeFetcher> {
        Arc::new(
            FakeFetcher::new(Some(dec!(180)))
                .with_category(
                    "UniqueAccessory",
                    Behavior::Listings(listings(&[
                        ("Mageblood", dec!(15000)),
                        ("Headhunter", dec!(9000)),
                        ("Headhunter Relic", dec!(9100)),
                    ])),
                )
                .with_category(
                    "Currency",
                    Behavior::Listings(listings(&[("Divine Orb", dec!(180))])),
                ),
        )
    }

    #[tokio::test]
    async fn test_fuzzy_price_check_in_default_league() {
        let service = service(fetcher());
        let check = service.price_check("magebl00d", None).await.unwrap();

        assert_eq!(check.item, "Mageblood");
        assert_eq!(check.league.as_str(), "Mercenaries");
        assert_eq!(check.chaos_value, dec!(15000));
        assert_eq!(check.divine_value, dec!(83.3));
        assert!(!check.exact);
        assert!(check.message.starts_with("Closest match for 'magebl00d'."));
    }

    #[tokio::test]
    async fn test_exact_price_check_in_named_league() {
        let service = service(fetcher());
        let check = service
            .price_check("divine orb", Some("standard"))
            .await
            .unwrap();

        assert_eq!(check.item, "Divine Orb");
        assert_eq!(check.league.as_str(), "Standard");
        assert_eq!(check.divine_value, dec!(1));
        assert!(check.exact);
        assert_eq!(check.score, 100);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_upstream() {
        let fetcher = fetcher();
        let service = service(fetcher.clone());

        let err = service
            .price_check("Mageblood", Some("Necropolis"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PriceCheckError::Validation(ValidationError::UnknownLeague("Necropolis".to_string()))
        );

        let err = service.price_check("  ", None).await.unwrap_err();
        assert_eq!(err, PriceCheckError::Validation(ValidationError::EmptyQuery));

        let err = service.price_check(&"x".repeat(101), None).await.unwrap_err();
        assert!(matches!(
            err,
            PriceCheckError::Validation(ValidationError::QueryTooLong { .. })
        ));

        assert_eq!(fetcher.calls("UniqueAccessory"), 0);
    }

    #[tokio::test]
    async fn test_unresolved_query_carries_suggestions() {
        let near_miss = format!("{}{}", "b".repeat(35), "a".repeat(65));
        let fetcher = fetcher();
        fetcher.set_category(
            "Currency",
            Behavior::Listings(listings(&[(near_miss.as_str(), dec!(1))])),
        );
        let service = service(fetcher);

        let err = service
            .price_check(&"a".repeat(100), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PriceCheckError::Unresolved {
                query: "a".repeat(100),
                suggestions: vec![Suggestion {
                    name: near_miss,
                    score: 65
                }],
            }
        );
    }

    #[tokio::test]
    async fn test_unrelated_query_is_not_found() {
        let service = service(fetcher());
        let err = service.price_check("xyzxyz", None).await.unwrap_err();
        assert_eq!(
            err,
            PriceCheckError::NotFound {
                query: "xyzxyz".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_catalog_is_unavailable_not_not_found() {
        let fetcher = Arc::new(
            FakeFetcher::new(Some(dec!(180)))
                .with_category("UniqueAccessory", Behavior::HttpError(503))
                .with_category("Currency", Behavior::HttpError(503)),
        );
        let service = service(fetcher);

        let err = service.price_check("Mageblood", None).await.unwrap_err();
        assert_eq!(
            err,
            PriceCheckError::CatalogUnavailable {
                league: "Mercenaries".to_string()
            }
        );
    }
}
