//! Fuzzy similarity scoring.
//!
//! [`weighted_ratio`] follows the usual "WRatio" recipe from fuzzy matching
//! libraries: the plain ratio, the best-aligned substring ratio when lengths
//! differ a lot, and the token-sort / token-set ratios (slightly discounted),
//! taking the best. All ratios are on a `0.0..=100.0` scale and are built on
//! normalized Levenshtein similarity.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use strsim::{generic_levenshtein, normalized_levenshtein};

use super::normalize;

/// Discount applied to token based ratios.
const TOKEN_SCALE: f64 = 0.95;

/// Length ratio from which substring alignment is considered.
const PARTIAL_LENGTH_RATIO: f64 = 1.5;

/// Length ratio from which substring matches get the heavier discount.
const LONG_PARTIAL_LENGTH_RATIO: f64 = 8.0;

/// Slack for float error when comparing an upper bound against a floor.
const EPSILON: f64 = 1e-9;

/// Floor that every ratio beats, so nothing is pruned.
const EXACT: f64 = -1.0;

/// Slice view strsim's generic Levenshtein can iterate without copying.
struct Chars<'a>(&'a [char]);

impl<'a> IntoIterator for &Chars<'a> {
    type Item = &'a char;
    type IntoIter = std::slice::Iter<'a, char>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn levenshtein_ratio(a: &[char], b: &[char]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 100.0;
    }
    let distance = generic_levenshtein(&Chars(a), &Chars(b));
    (1.0 - distance as f64 / longest as f64) * 100.0
}

/// Size of the multiset intersection of two character sequences.
///
/// The edit distance between `a` and `b` is at least `max(len) - overlap`,
/// so `100 * overlap / max(len)` bounds their ratio from above.
fn overlap(a: &[char], b: &[char]) -> usize {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();

    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

/// Running maximum of component ratios, ignoring anything at or below a floor.
struct Best {
    floor: f64,
    value: Option<f64>,
}

impl Best {
    fn new(floor: f64) -> Self {
        Self { floor, value: None }
    }

    fn to_beat(&self) -> f64 {
        self.value.unwrap_or(self.floor)
    }

    fn offer(&mut self, candidate: Option<f64>) {
        if let Some(value) = candidate {
            if value > self.to_beat() {
                self.value = Some(value);
            }
        }
    }

    /// Offer `scale * ratio`, where `ratio` only needs computing above `to_beat / scale`.
    fn offer_scaled(&mut self, scale: f64, ratio: impl FnOnce(f64) -> Option<f64>) {
        let value = ratio(self.to_beat() / scale).map(|r| r * scale);
        self.offer(value);
    }
}

/// Ratio of two char sequences when it exceeds `floor`, `None` otherwise.
fn ratio_over(a: &[char], b: &[char], floor: f64) -> Option<f64> {
    let longest = a.len().max(b.len());
    if longest > 0 {
        let bound = 100.0 * overlap(a, b) as f64 / longest as f64;
        if bound + EPSILON <= floor {
            return None;
        }
    }
    let value = levenshtein_ratio(a, b);
    (value > floor).then_some(value)
}

/// Partial ratio when it exceeds `floor`, `None` otherwise.
///
/// Windows whose character overlap with the shorter string cannot beat the
/// best score so far are skipped without running Levenshtein.
fn partial_over(a: &[char], b: &[char], floor: f64) -> Option<f64> {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let n = shorter.len();
    if n == 0 {
        return (0.0 > floor).then_some(0.0);
    }
    if 100.0 * overlap(shorter, longer) as f64 / n as f64 + EPSILON <= floor {
        return None;
    }

    // per character: occurrences in `shorter` the current window lacks
    let mut deficit: HashMap<char, isize> = HashMap::new();
    for &c in shorter {
        *deficit.entry(c).or_insert(0) += 1;
    }
    let mut missing = n;

    let mut best = Best::new(floor);
    for (end, &incoming) in longer.iter().enumerate() {
        let d = deficit.entry(incoming).or_insert(0);
        if *d > 0 {
            missing -= 1;
        }
        *d -= 1;

        if end >= n {
            let d = deficit.entry(longer[end - n]).or_insert(0);
            *d += 1;
            if *d > 0 {
                missing += 1;
            }
        }
        if end + 1 < n {
            continue;
        }

        let bound = 100.0 * (n - missing) as f64 / n as f64;
        if bound + EPSILON <= best.to_beat() {
            continue;
        }
        best.offer(Some(levenshtein_ratio(shorter, &longer[end + 1 - n..=end])));
        if best.value.is_some_and(|v| v >= 100.0) {
            break;
        }
    }
    best.value
}

/// Plain similarity of the two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

/// Best ratio between the shorter string and any equally long window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    partial_over(&chars(a), &chars(b), EXACT).unwrap_or(0.0)
}

fn sorted_tokens(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

fn join(tokens: &[&str]) -> String {
    tokens.join(" ")
}

/// Whitespace separated tokens, sorted and rejoined with single spaces.
fn sorted_join(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    join(&tokens)
}

/// Ratio after sorting the whitespace separated tokens of both strings.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio_over(&chars(&sorted_join(a)), &chars(&sorted_join(b)), EXACT).unwrap_or(0.0)
}

/// Token-set split shared by the token-set ratios: (intersection, a - b, b - a).
fn token_partition<'a>(a: &'a str, b: &'a str) -> (Vec<&'a str>, Vec<&'a str>, Vec<&'a str>) {
    let a_set = sorted_tokens(a);
    let b_set = sorted_tokens(b);
    let common = a_set.intersection(&b_set).copied().collect();
    let a_only = a_set.difference(&b_set).copied().collect();
    let b_only = b_set.difference(&a_set).copied().collect();
    (common, a_only, b_only)
}

fn token_set_over(a: &str, b: &str, floor: f64) -> Option<f64> {
    let (common, a_only, b_only) = token_partition(a, b);

    if common.is_empty() {
        if a_only.is_empty() || b_only.is_empty() {
            return (0.0 > floor).then_some(0.0);
        }
        return ratio_over(&chars(&join(&a_only)), &chars(&join(&b_only)), floor);
    }

    if a_only.is_empty() || b_only.is_empty() {
        return (100.0 > floor).then_some(100.0);
    }

    let common_joined = chars(&join(&common));
    let combined_a = chars(&format!("{} {}", join(&common), join(&a_only)));
    let combined_b = chars(&format!("{} {}", join(&common), join(&b_only)));

    let mut best = Best::new(floor);
    best.offer(ratio_over(&common_joined, &combined_a, best.to_beat()));
    best.offer(ratio_over(&common_joined, &combined_b, best.to_beat()));
    best.offer(ratio_over(&combined_a, &combined_b, best.to_beat()));
    best.value
}

/// Ratio over token sets; a string whose tokens are all contained in the other scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_over(a, b, EXACT).unwrap_or(0.0)
}

/// Substring alignment over tokens: any shared token scores 100, otherwise the
/// best of the sorted and the set-difference partial ratios.
fn partial_token_over(a: &str, b: &str, floor: f64) -> Option<f64> {
    let (common, a_only, b_only) = token_partition(a, b);
    if !common.is_empty() {
        return (100.0 > floor).then_some(100.0);
    }

    let (a_sorted, b_sorted) = (sorted_join(a), sorted_join(b));
    let mut best = Best::new(floor);
    best.offer(partial_over(&chars(&a_sorted), &chars(&b_sorted), best.to_beat()));

    // without repeated tokens the set differences are the sorted strings again
    let (a_diff, b_diff) = (join(&a_only), join(&b_only));
    if a_diff != a_sorted || b_diff != b_sorted {
        best.offer(partial_over(&chars(&a_diff), &chars(&b_diff), best.to_beat()));
    }
    best.value
}

/// Weighted ratio when it exceeds `floor`, `None` otherwise.
///
/// Every component is skipped once its upper bound cannot lift the result,
/// so any returned value is exactly what a full comparison would produce.
fn weighted_over(a: &str, a_chars: &[char], b: &str, floor: f64) -> Option<f64> {
    let b_chars = chars(b);
    let (a_len, b_len) = (a_chars.len(), b_chars.len());
    if a_len == 0 || b_len == 0 {
        return (0.0 > floor).then_some(0.0);
    }

    let length_ratio = a_len.max(b_len) as f64 / a_len.min(b_len) as f64;
    let mut best = Best::new(floor);
    best.offer(ratio_over(a_chars, &b_chars, best.to_beat()));

    if length_ratio < PARTIAL_LENGTH_RATIO {
        best.offer_scaled(TOKEN_SCALE, |to_beat| {
            ratio_over(&chars(&sorted_join(a)), &chars(&sorted_join(b)), to_beat)
        });
        best.offer_scaled(TOKEN_SCALE, |to_beat| token_set_over(a, b, to_beat));
        return best.value;
    }

    let partial_scale = if length_ratio < LONG_PARTIAL_LENGTH_RATIO {
        0.9
    } else {
        0.6
    };

    best.offer_scaled(partial_scale, |to_beat| partial_over(a_chars, &b_chars, to_beat));
    best.offer_scaled(partial_scale, |to_beat| {
        partial_token_over(a, b, to_beat / TOKEN_SCALE).map(|r| r * TOKEN_SCALE)
    });
    best.value
}

/// Weighted combination of the individual ratios (`0.0..=100.0`).
///
/// Inputs are compared as given; callers normalize first.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    weighted_over(a, &chars(a), b, EXACT).unwrap_or(0.0)
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Similarity of two already normalized strings as an integer in `0..=100`.
pub fn score_normalized(query: &str, candidate: &str) -> u8 {
    to_score(weighted_ratio(query, candidate))
}

/// Similarity of two arbitrary strings as an integer in `0..=100`.
///
/// Both sides are normalized first, so strings that normalize identically score 100.
pub fn score(query: &str, candidate: &str) -> u8 {
    score_normalized(&normalize(query), &normalize(candidate))
}

/// A candidate with its score, as produced by [`rank_all`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    /// Position of the candidate in the input sequence.
    pub index: usize,
    pub candidate: &'a str,
    pub score: u8,
}

/// Score every candidate against an already normalized query.
///
/// Sorted by descending score; equal scores keep their input order.
pub fn rank_all<'a, I>(query: &str, candidates: I) -> Vec<ScoredCandidate<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    rank_above(query, candidates, 0)
}

/// Like [`rank_all`], but only keeps candidates scoring at least `min_score`.
///
/// Candidates that provably fall short are dropped before the expensive
/// comparisons run, which keeps lookups in large catalogs fast. Scores of
/// the kept candidates are identical to [`score_normalized`].
pub fn rank_above<'a, I>(query: &str, candidates: I, min_score: u8) -> Vec<ScoredCandidate<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let query_chars = chars(query);
    // anything rounding to `min_score` or above
    let floor = f64::from(min_score) - 0.5 - EPSILON;

    let mut ranked: Vec<ScoredCandidate<'a>> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            let score = to_score(weighted_over(query, &query_chars, candidate, floor)?);
            (score >= min_score).then_some(ScoredCandidate {
                index,
                candidate,
                score,
            })
        })
        .collect();
    // stable: ties keep input order
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
