use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::errors::PriceCheckError;
use crate::models::{League, MatchedEntity, RateSource, ReferenceRate};

/// Round a reported value to one decimal place, halves away from zero.
pub fn round_value(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// A successful price check.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCheck {
    /// Canonical catalog name of the matched item.
    pub item: String,
    pub category: String,
    pub chaos_value: Decimal,
    pub divine_value: Decimal,
    pub divine_chaos_equivalent: Decimal,
    pub league: League,
    pub exact: bool,
    pub score: u8,
    /// True when the reference rate is the configured fallback.
    pub estimated_rate: bool,
    pub message: String,
}

impl PriceCheck {
    /// Fails when the value cannot be expressed in the premium currency,
    /// which only happens for a vanishingly small rate.
    pub fn new(
        query: &str,
        matched: &MatchedEntity,
        rate: ReferenceRate,
        league: League,
    ) -> Result<Self, PriceCheckError> {
        let entity = &matched.entity;
        let chaos_value = round_value(entity.value());
        let divine_value = match entity.value().checked_div(rate.value()) {
            Some(quotient) => round_value(quotient),
            None => {
                return Err(PriceCheckError::UnusableRate {
                    league: league.to_string(),
                })
            }
        };
        let divine_chaos_equivalent = round_value(rate.value());

        let mut message = String::new();
        if !matched.exact {
            message.push_str(&format!("Closest match for '{}'. ", query.trim()));
        }
        message.push_str(&format!(
            "{}: {} chaos ({} divine) in {}",
            entity.name(),
            chaos_value,
            divine_value,
            league
        ));

        Ok(Self {
            item: entity.name().to_string(),
            category: entity.category().to_string(),
            chaos_value,
            divine_value,
            divine_chaos_equivalent,
            league,
            exact: matched.exact,
            score: matched.score,
            estimated_rate: rate.source() == RateSource::Fallback,
            message,
        })
    }
}
