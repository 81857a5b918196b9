use std::collections::HashSet;

use tracing::debug;

use super::ResolverConfig;
use crate::errors::ValidationError;
use crate::models::{CatalogSnapshot, MatchedEntity, Resolution, Suggestion};
use crate::text::{normalize, rank_above};

/// Check a raw query and return its normalized form.
///
/// A query is empty when it is blank or when normalization strips every
/// character from it. Length is counted in characters after trimming.
pub fn validate_query(query: &str, config: &ResolverConfig) -> Result<String, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }

    let length = trimmed.chars().count();
    if length > config.max_query_len {
        return Err(ValidationError::QueryTooLong {
            length,
            max: config.max_query_len,
        });
    }

    let normalized = normalize(trimmed);
    if normalized.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(normalized)
}

/// Resolve `query` against `snapshot`.
///
/// Scoring never fails; the only errors are rejected queries.
pub fn resolve(
    query: &str,
    snapshot: &CatalogSnapshot,
    config: &ResolverConfig,
) -> Result<Resolution, ValidationError> {
    let normalized = validate_query(query, config)?;

    if let Some(entity) = snapshot.find_exact(&normalized) {
        return Ok(Resolution::Matched(MatchedEntity {
            entity: entity.clone(),
            score: 100,
            exact: true,
        }));
    }

    // candidates below both thresholds can neither match nor be suggested
    let threshold = config.acceptance_for(normalized.chars().count());
    let ranked = rank_above(
        &normalized,
        snapshot.entities().iter().map(|e| e.normalized_name()),
        threshold.min(config.suggestion_threshold),
    );
    let Some(best) = ranked.first() else {
        debug!("No candidate for '{}' in {} entities", query, snapshot.len());
        return Ok(Resolution::NotFound);
    };

    if best.score >= threshold {
        let entity = &snapshot.entities()[best.index];
        debug!(
            "Resolved '{}' to '{}' (score {}, threshold {})",
            query,
            entity.name(),
            best.score,
            threshold
        );
        return Ok(Resolution::Matched(MatchedEntity {
            entity: entity.clone(),
            score: best.score,
            exact: false,
        }));
    }

    let mut seen = HashSet::new();
    let suggestions: Vec<Suggestion> = ranked
        .iter()
        .take_while(|c| c.score >= config.suggestion_threshold)
        .filter_map(|c| {
            let name = snapshot.entities()[c.index].name();
            seen.insert(name).then(|| Suggestion {
                name: name.to_string(),
                score: c.score,
            })
        })
        .take(config.max_suggestions)
        .collect();

    if suggestions.is_empty() {
        debug!("No candidate for '{}' (best score {})", query, best.score);
        Ok(Resolution::NotFound)
    } else {
        Ok(Resolution::Unresolved(suggestions))
    }
}
