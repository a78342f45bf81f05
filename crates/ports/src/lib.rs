//! # instance-catalog-ports
//!
//! Port traits for the instance-catalog hexagonal architecture.
//!
//! This crate defines the interfaces between the use cases and the
//! infrastructure layer. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod catalog;
pub mod logger;
pub mod telemetry;

pub use catalog::*;
pub use logger::*;
pub use telemetry::*;

// Re-export domain types used in port signatures, so adapter crates can
// implement ports without importing `instance-catalog-domain` for them.
pub use instance_catalog_domain::{InstanceTypeDescriptor, InstanceTypeName, VirtualizationType};
