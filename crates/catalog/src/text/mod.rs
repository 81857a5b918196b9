//! Text canonicalization and approximate string matching.
//!
//! Both halves are pure, total functions: they never fail, whatever the input.

mod normalize;
mod similarity;

pub use normalize::normalize;
pub use similarity::{
    partial_ratio, rank_above, rank_all, ratio, score, score_normalized, token_set_ratio,
    token_sort_ratio, weighted_ratio, ScoredCandidate,
};
