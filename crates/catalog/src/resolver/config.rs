pub const DEFAULT_ACCEPTANCE_THRESHOLD: u8 = 70;
pub const DEFAULT_SHORT_QUERY_THRESHOLD: u8 = 85;
pub const DEFAULT_SHORT_QUERY_MAX_LEN: usize = 5;
pub const DEFAULT_SUGGESTION_THRESHOLD: u8 = 60;
pub const DEFAULT_MAX_QUERY_LEN: usize = 100;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Thresholds and limits applied by [`resolve`](super::resolve).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Minimum score for a fuzzy candidate to be accepted as the match.
    pub acceptance_threshold: u8,
    /// Acceptance threshold applied instead to short queries, when stricter.
    pub short_query_threshold: u8,
    /// Normalized length at or below which a query counts as short. `0` disables the profile.
    pub short_query_max_len: usize,
    /// Minimum score for a candidate to be offered as a suggestion.
    pub suggestion_threshold: u8,
    /// Maximum query length in characters, after trimming.
    pub max_query_len: usize,
    pub max_suggestions: usize,
}

impl ResolverConfig {
    /// Acceptance threshold for a query of `normalized_len` characters.
    pub fn acceptance_for(&self, normalized_len: usize) -> u8 {
        if self.short_query_max_len > 0 && normalized_len <= self.short_query_max_len {
            self.acceptance_threshold.max(self.short_query_threshold)
        } else {
            self.acceptance_threshold
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            short_query_threshold: DEFAULT_SHORT_QUERY_THRESHOLD,
            short_query_max_len: DEFAULT_SHORT_QUERY_MAX_LEN,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
            max_query_len: DEFAULT_MAX_QUERY_LEN,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}
