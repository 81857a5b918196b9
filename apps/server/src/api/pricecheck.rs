use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use pricecheck_catalog::{PriceCheck, ValidationError};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Debug, Deserialize)]
pub struct PriceCheckParams {
    item: Option<String>,
    league: Option<String>,
}

pub async fn price_check(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PriceCheckParams>, QueryRejection>,
) -> ApiResult<Json<PriceCheck>> {
    let Query(params) = query?;
    let item = params.item.ok_or(ValidationError::MissingItem)?;
    let check = state
        .price_check_service
        .price_check(&item, params.league.as_deref())
        .await?;
    Ok(Json(check))
}
