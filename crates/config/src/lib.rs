//! # instance-catalog-config
//!
//! Configuration schema, validation, and normalization logic for the CLI.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    AppEnv, ENV_CATALOG_FIXTURE_PATH, ENV_CATALOG_PROVIDER, ENV_CONFIG_PATH, ENV_LOG_LEVEL,
    EnvParseError, apply_env_overrides,
};
pub use load::{load_app_config_from_path, load_app_config_from_sources, load_app_config_std_env};
pub use schema::{
    AppConfig, CatalogConfig, CatalogProviderKind, ConfigSchemaError, DEFAULT_EXCLUDE_LIST,
    LogLevelSetting, ObservabilityConfig, ValidatedAppConfig, parse_app_config_json,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
