use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::league::League;

/// Chaos value of one divine orb used when the upstream never supplied one.
pub const DEFAULT_FALLBACK_RATE: Decimal = Decimal::from_parts(150, 0, 0, false, 0);

/// Where a snapshot's reference rate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Upstream,
    Fallback,
}

/// Base-unit value of one premium currency unit. Always strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceRate {
    value: Decimal,
    source: RateSource,
}

impl ReferenceRate {
    /// Accept an upstream-supplied rate. Zero or negative rates are rejected.
    pub fn upstream(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self {
            value,
            source: RateSource::Upstream,
        })
    }

    /// The configured fallback. A non-positive configuration degrades to
    /// [`DEFAULT_FALLBACK_RATE`].
    pub fn fallback(value: Decimal) -> Self {
        let value = if value > Decimal::ZERO {
            value
        } else {
            DEFAULT_FALLBACK_RATE
        };
        Self {
            value,
            source: RateSource::Fallback,
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn source(&self) -> RateSource {
        self.source
    }
}

/// An immutable view of one league's catalog at a point in time.
///
/// Snapshots are built whole and shared behind an `Arc`; the catalog store
/// swaps the pointer, so readers never observe a partial update.
#[derive(Debug)]
pub struct CatalogSnapshot {
    league: League,
    entities: Vec<Entity>,
    reference_rate: ReferenceRate,
    fetched_at: DateTime<Utc>,
    /// normalized name -> index of its first entity
    exact_index: HashMap<String, usize>,
}

impl CatalogSnapshot {
    pub fn new(
        league: League,
        entities: Vec<Entity>,
        reference_rate: ReferenceRate,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut exact_index = HashMap::with_capacity(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            exact_index
                .entry(entity.normalized_name().to_string())
                .or_insert(idx);
        }
        Self {
            league,
            entities,
            reference_rate,
            fetched_at,
            exact_index,
        }
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn reference_rate(&self) -> ReferenceRate {
        self.reference_rate
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// First entity whose normalized name equals `normalized`.
    pub fn find_exact(&self, normalized: &str) -> Option<&Entity> {
        self.exact_index
            .get(normalized)
            .map(|&idx| &self.entities[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(entities: Vec<Entity>) -> CatalogSnapshot {
        CatalogSnapshot::new(
            League::new("Standard"),
            entities,
            ReferenceRate::upstream(dec!(180)).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_reference_rate_rejects_non_positive() {
        assert!(ReferenceRate::upstream(dec!(0)).is_none());
        assert!(ReferenceRate::upstream(dec!(-3.5)).is_none());
        assert_eq!(ReferenceRate::upstream(dec!(180)).unwrap().value(), dec!(180));
    }

    #[test]
    fn test_fallback_rate_is_never_zero() {
        let rate = ReferenceRate::fallback(dec!(0));
        assert_eq!(rate.value(), DEFAULT_FALLBACK_RATE);
        assert_eq!(rate.source(), RateSource::Fallback);
        assert_eq!(ReferenceRate::fallback(dec!(200)).value(), dec!(200));
        assert_eq!(DEFAULT_FALLBACK_RATE, dec!(150));
    }

    #[test]
    fn test_find_exact_returns_first_listing() {
        let snap = snapshot(vec![
            Entity::new("Mageblood", dec!(15000), "UniqueAccessory"),
            Entity::new("Tabula Rasa", dec!(10), "UniqueArmour"),
            Entity::new("MAGEBLOOD", dec!(1), "UniqueAccessory"),
        ]);
        let found = snap.find_exact("mageblood").unwrap();
        assert_eq!(found.value(), dec!(15000));
        assert!(snap.find_exact("tabula").is_none());
        assert_eq!(snap.len(), 3);
    }
}
