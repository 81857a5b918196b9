//! Price checks: league and query validation, catalog lookup, resolution and
//! conversion into the premium currency.

mod pricing_model;
mod pricing_service;
mod pricing_traits;

pub use pricing_model::{round_value, PriceCheck};
pub use pricing_service::PriceCheckService;
pub use pricing_traits::PriceCheckServiceTrait;
