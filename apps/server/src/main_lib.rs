use std::sync::Arc;

use crate::config::{Config, LogFormat};
use pricecheck_catalog::{
    CatalogFetcher, CatalogStore, League, LeagueRegistry, PoeNinjaFetcher, PriceCheckService,
    PriceCheckServiceTrait,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub price_check_service: Arc<dyn PriceCheckServiceTrait>,
    pub catalog_store: CatalogStore,
    pub default_league: League,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let fetcher: Arc<dyn CatalogFetcher> =
        Arc::new(PoeNinjaFetcher::with_base_url(&config.upstream_base_url));
    build_state_with_fetcher(config, fetcher).await
}

/// Wire the catalog, resolver and service around `fetcher`.
pub async fn build_state_with_fetcher(
    config: &Config,
    fetcher: Arc<dyn CatalogFetcher>,
) -> anyhow::Result<Arc<AppState>> {
    let leagues = LeagueRegistry::new(&config.leagues, config.default_league.as_deref());
    if let Some(requested) = &config.default_league {
        if !leagues.default_league().as_str().eq_ignore_ascii_case(requested) {
            anyhow::bail!(
                "PC_DEFAULT_LEAGUE '{}' is not one of the configured leagues",
                requested
            );
        }
    }
    tracing::info!(
        "Leagues: {} (default {})",
        leagues
            .leagues()
            .iter()
            .map(League::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        leagues.default_league()
    );

    let store = CatalogStore::new(fetcher, &leagues, config.catalog.clone());
    let loaded = store.load_persisted().await;
    if let Some(dir) = &config.catalog.snapshot_dir {
        tracing::info!("Loaded {} persisted catalogs from {}", loaded, dir.display());
    }

    let default_league = leagues.default_league().clone();
    let service = PriceCheckService::new(store.clone(), leagues, config.resolver.clone());

    Ok(Arc::new(AppState {
        price_check_service: Arc::new(service),
        catalog_store: store,
        default_league,
    }))
}
