//! Per-refresh diagnostics: what happened to every category and to the
//! reference rate, and what the store did with the result.

use rust_decimal::Decimal;

use crate::models::League;

/// What happened to one category during a refresh.
#[derive(Clone, Debug, PartialEq)]
pub enum CategoryOutcome {
    /// Fetched successfully (possibly zero listings).
    Fetched { entities: usize },
    /// Not attempted: the category's circuit is open.
    CircuitOpen,
    /// Attempted and failed.
    Failed { error: String },
}

/// Record of a single category attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryAttempt {
    pub category: String,
    pub outcome: CategoryOutcome,
}

/// What happened to the reference rate request.
#[derive(Clone, Debug, PartialEq)]
pub enum RateOutcome {
    Fetched(Decimal),
    Failed { error: String },
    /// Not requested because every category failed.
    NotAttempted,
}

/// What the store did with the refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshDisposition {
    /// New snapshot committed; TTL clock restarted.
    Committed,
    /// New snapshot committed with the fallback rate; TTL clock not started.
    CommittedWithFallbackRate,
    /// Nothing committed; the previous snapshot (if any) stays current.
    Retained,
}

/// Detailed result of one refresh.
#[derive(Clone, Debug)]
pub struct RefreshReport {
    pub league: League,
    pub attempts: Vec<CategoryAttempt>,
    pub rate: RateOutcome,
    pub disposition: RefreshDisposition,
}

impl RefreshReport {
    pub fn new(league: League) -> Self {
        Self {
            league,
            attempts: Vec::new(),
            rate: RateOutcome::NotAttempted,
            disposition: RefreshDisposition::Retained,
        }
    }

    pub fn record_fetched(&mut self, category: &str, entities: usize) {
        self.push(category, CategoryOutcome::Fetched { entities });
    }

    pub fn record_circuit_open(&mut self, category: &str) {
        self.push(category, CategoryOutcome::CircuitOpen);
    }

    pub fn record_failed(&mut self, category: &str, error: String) {
        self.push(category, CategoryOutcome::Failed { error });
    }

    fn push(&mut self, category: &str, outcome: CategoryOutcome) {
        self.attempts.push(CategoryAttempt {
            category: category.to_string(),
            outcome,
        });
    }

    /// Number of categories that delivered data.
    pub fn fetched_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, CategoryOutcome::Fetched { .. }))
            .count()
    }

    /// Categories that failed or were skipped.
    pub fn failed_categories(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| !matches!(a.outcome, CategoryOutcome::Fetched { .. }))
            .map(|a| a.category.as_str())
            .collect()
    }

    pub fn total_entities(&self) -> usize {
        self.attempts
            .iter()
            .map(|a| match a.outcome {
                CategoryOutcome::Fetched { entities } => entities,
                _ => 0,
            })
            .sum()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let failed = self.failed_categories();
        let rate = match &self.rate {
            RateOutcome::Fetched(rate) => format!("rate {}", rate),
            RateOutcome::Failed { error } => format!("rate FAILED ({})", error),
            RateOutcome::NotAttempted => "rate not attempted".to_string(),
        };
        format!(
            "{}: {}/{} categories, {} entities, {}, {:?}{}",
            self.league,
            self.fetched_count(),
            self.attempts.len(),
            self.total_entities(),
            rate,
            self.disposition,
            if failed.is_empty() {
                String::new()
            } else {
                format!(", failed: {}", failed.join(", "))
            }
        )
    }
}
