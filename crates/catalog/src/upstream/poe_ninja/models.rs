//! poe.ninja API response models.
//!
//! Lines are kept as raw JSON values at the document level so that one bad
//! line can be skipped without rejecting the whole category.

use serde::Deserialize;
use serde_json::Value;

/// Response of the `itemoverview` and `currencyoverview` endpoints.
#[derive(Debug, Deserialize)]
pub struct OverviewResponse {
    /// Absent when the upstream answers with an error document.
    pub lines: Option<Vec<Value>>,
}

/// One line of an `itemoverview` document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLine {
    pub name: String,
    pub chaos_value: f64,
}

/// One line of a `currencyoverview` document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyLine {
    pub currency_type_name: String,
    pub chaos_equivalent: Option<f64>,
}
