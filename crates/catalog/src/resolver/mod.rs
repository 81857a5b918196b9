//! Resolution of free-text queries against a catalog snapshot.
//!
//! Resolution is layered: exact match on the normalized name, then the best
//! fuzzy match above the acceptance threshold, then "did you mean"
//! suggestions, then nothing.

mod config;
mod engine;

pub use config::{
    ResolverConfig, DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_MAX_QUERY_LEN, DEFAULT_MAX_SUGGESTIONS,
    DEFAULT_SHORT_QUERY_MAX_LEN, DEFAULT_SHORT_QUERY_THRESHOLD, DEFAULT_SUGGESTION_THRESHOLD,
};
pub use engine::{resolve, validate_query};
