use rust_decimal::Decimal;

use crate::text::normalize;

/// One listing as delivered by an upstream fetcher, before it becomes an [`Entity`].
#[derive(Clone, Debug, PartialEq)]
pub struct RawListing {
    pub name: String,
    pub value: Decimal,
}

impl RawListing {
    pub fn new(name: impl Into<String>, value: Decimal) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A priced catalog entry.
///
/// Entities are created by a successful refresh and replaced wholesale by the
/// next one; they are never mutated. The normalized name is computed once at
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    name: String,
    value: Decimal,
    category: String,
    normalized_name: String,
}

impl Entity {
    pub fn new(name: impl Into<String>, value: Decimal, category: impl Into<String>) -> Self {
        let name = name.into();
        let normalized_name = normalize(&name);
        Self {
            name,
            value,
            category: category.into(),
            normalized_name,
        }
    }

    /// Display name as listed upstream.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value in the base unit (chaos).
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Upstream category the entity was listed under.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entity_caches_normalized_name() {
        let entity = Entity::new("Kitava's Thirst", dec!(12.5), "UniqueArmour");
        assert_eq!(entity.name(), "Kitava's Thirst");
        assert_eq!(entity.normalized_name(), "kitavas thirst");
        assert_eq!(entity.value(), dec!(12.5));
        assert_eq!(entity.category(), "UniqueArmour");
    }

    #[test]
    fn test_normalized_name_is_recomputable() {
        let a = Entity::new("Ñoño  Épée", dec!(1), "BaseType");
        let b = Entity::new("Ñoño  Épée", dec!(2), "BaseType");
        assert_eq!(a.normalized_name(), b.normalized_name());
        assert_eq!(a.normalized_name(), "nono epee");
    }
}
