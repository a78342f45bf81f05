//! # instance-catalog-domain
//!
//! Domain primitives and value objects for instance type catalogs.
//!
//! - **Primitives** - `InstanceTypeName`, `VirtualizationType`
//! - **Descriptors** - `InstanceTypeDescriptor`
//! - **Exclusion** - `ExcludeList`, `ExcludeMatchMode`, `EmptyExcludePolicy`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use instance_catalog_shared::shared_crate_version;

pub mod exclude;
pub mod instance_type;
pub mod primitives;

pub use exclude::{
    DEFAULT_EMPTY_EXCLUDE_POLICY, EmptyExcludePolicy, ExcludeList, ExcludeMatchMode,
};
pub use instance_type::InstanceTypeDescriptor;
pub use primitives::{InstanceTypeName, PrimitiveError, VirtualizationType};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
