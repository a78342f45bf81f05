//! # instance-catalog-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Catalog adapter selection.
mod catalog_factory;
/// Runtime composition for the listing command.
pub mod list_included;
/// Logger and telemetry wiring.
pub mod observability;

use instance_catalog_shared::ErrorEnvelope;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

pub use catalog_factory::build_catalog_port;
pub use list_included::{RunOptions, RunReport, run_list_included, run_list_included_with_ctx};
pub use observability::{ProfileRecorder, build_logger, build_stderr_logger, log_level_from_setting};

pub use instance_catalog_config::load_app_config_std_env;

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
