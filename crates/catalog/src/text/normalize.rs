//! Canonical form used for equality and similarity between item names.
//!
//! Pipeline:
//! - lowercase
//! - canonical decomposition (NFD) and removal of combining marks
//! - removal of anything that is not a letter, digit or whitespace
//! - whitespace collapsing and trimming

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for comparison.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
///
/// ```
/// use pricecheck_catalog::text::normalize;
///
/// assert_eq!(normalize("  Kitava's   THIRST "), "kitavas thirst");
/// assert_eq!(normalize("Ël Dorado"), "el dorado");
/// ```
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
