use serde::Serialize;

use super::entity::Entity;

/// The entity a query resolved to.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedEntity {
    pub entity: Entity,
    /// Similarity in `0..=100`; always 100 for exact matches.
    pub score: u8,
    /// True when the normalized query equals the entity's normalized name.
    pub exact: bool,
}

/// A "did you mean" candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub score: u8,
}

/// Outcome of resolving a (valid) query against a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Matched(MatchedEntity),
    /// No candidate cleared the acceptance threshold; up to three close ones did
    /// clear the suggestion threshold.
    Unresolved(Vec<Suggestion>),
    NotFound,
}
