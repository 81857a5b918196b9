//! Background refresh of the default league.
//!
//! Keeps the most queried catalog warm: the first refresh runs at startup,
//! then one per TTL, so lookups rarely wait on the upstream.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;
use pricecheck_catalog::RefreshDisposition;

/// Shortest allowed refresh period.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the refresh loop for the default league.
pub fn start_refresh_scheduler(state: Arc<AppState>) {
    let period = state.catalog_store.config().ttl.max(MIN_INTERVAL);
    tokio::spawn(async move {
        info!(
            "Refresh scheduler started for '{}' ({:?} interval)",
            state.default_league, period
        );

        let mut refresh_interval = interval(period);
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            refresh_interval.tick().await;
            run_scheduled_refresh(&state).await;
        }
    });
}

/// Runs a single scheduled refresh.
async fn run_scheduled_refresh(state: &Arc<AppState>) {
    debug!("Running scheduled refresh of '{}'", state.default_league);
    match state.catalog_store.refresh(&state.default_league).await {
        Ok(report) if report.disposition == RefreshDisposition::Retained => {
            warn!("Scheduled refresh kept the previous catalog: {}", report.summary());
        }
        Ok(report) => debug!("Scheduled refresh done: {}", report.summary()),
        Err(e) => warn!("Scheduled refresh failed: {}", e),
    }
}
