use std::sync::Arc;

use axum::{extract::State, Json};
use pricecheck_catalog::{League, LeagueStatus};

use crate::main_lib::AppState;

/// Recognized leagues, default first.
pub async fn list_leagues(State(state): State<Arc<AppState>>) -> Json<Vec<League>> {
    let registry = state.price_check_service.leagues();
    let default = registry.default_league();
    let mut leagues = vec![default.clone()];
    leagues.extend(registry.leagues().iter().filter(|l| *l != default).cloned());
    Json(leagues)
}

/// Cache state of every league.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Vec<LeagueStatus>> {
    Json(state.price_check_service.status())
}
