//! Reference presets: catalog lookup and detail fetching over HTTP

pub mod catalog;
pub mod fetch;
pub mod resolver;
pub mod retry;

pub use catalog::{PresetCatalogEntry, find_entry, parse_catalog};
pub use fetch::{HttpFetcher, JsonFetcher};
pub use resolver::{PresetLookup, PresetResolver, ResolvedPresets};
pub use retry::RetryPolicy;
