//! # instance-catalog-app
//!
//! Application use cases for listing instance types.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod catalog_filter;
pub mod error;
pub mod exclude_matcher;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use catalog_filter::{InstanceCatalogFilter, ListIncludedOutput, ListIncludedStats};
pub use error::CatalogFilterError;
pub use exclude_matcher::{ExcludeMatcher, ExcludeMatcherOptions};
