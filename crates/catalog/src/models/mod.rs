//! Domain models for the catalog crate.
//!
//! This module contains:
//! - Entity records and the atomically-replaced catalog snapshot
//! - League (catalog partition) and category identifiers
//! - Resolution outcome types

mod entity;
mod league;
mod resolution;
mod snapshot;

pub use entity::{Entity, RawListing};
pub use league::{Category, League, LeagueRegistry, DEFAULT_CATEGORIES, DEFAULT_LEAGUES};
pub use resolution::{MatchedEntity, Resolution, Suggestion};
pub use snapshot::{CatalogSnapshot, RateSource, ReferenceRate, DEFAULT_FALLBACK_RATE};
