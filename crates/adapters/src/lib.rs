//! # instance-catalog-adapters
//!
//! Adapter implementations for ports (instance catalogs, logging, telemetry).
//! This crate depends on `ports`, `domain`, and `shared`.

/// Instance catalog adapters (EC2, fixture).
pub mod catalog;

pub mod log_sink;
pub mod logger;
pub mod telemetry;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(feature = "ec2")]
pub use catalog::ec2::Ec2Catalog;
pub use catalog::fixture::FixtureCatalog;
pub use log_sink::{FileLogSink, LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use telemetry::{JsonTelemetry, TaggedTelemetry};
