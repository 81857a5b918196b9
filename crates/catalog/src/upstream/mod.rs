//! Upstream price feed abstractions and implementations.
//!
//! This module contains:
//! - The `CatalogFetcher` trait every feed implements
//! - Rate limiting declaration for a feed
//! - The poe.ninja implementation
//!
//! Fetchers only know how to talk to one feed. Retries, circuit breaking,
//! timeouts and snapshot assembly live in the store module.

mod capabilities;
mod traits;

pub mod poe_ninja;

pub use capabilities::RateLimit;
pub use traits::CatalogFetcher;
