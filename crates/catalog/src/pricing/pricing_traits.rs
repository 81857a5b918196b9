use async_trait::async_trait;

use super::PriceCheck;
use crate::errors::PriceCheckError;
use crate::models::LeagueRegistry;
use crate::store::LeagueStatus;

/// Trait defining the contract for price check operations.
#[async_trait]
pub trait PriceCheckServiceTrait: Send + Sync {
    fn leagues(&self) -> &LeagueRegistry;

    /// Price `item` in `league` (the default league when `None`).
    async fn price_check(
        &self,
        item: &str,
        league: Option<&str>,
    ) -> Result<PriceCheck, PriceCheckError>;

    fn status(&self) -> Vec<LeagueStatus>;
}
