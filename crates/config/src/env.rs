//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present must carry a valid,
//! non-blank value. The exclude list is never read from the environment.

use crate::schema::{AppConfig, CatalogProviderKind, LogLevelSetting, ValidatedAppConfig};
use instance_catalog_shared::{ErrorCode, ErrorEnvelope, REDACTED, is_secret_key};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Env var: catalog provider (`ec2` or `fixture`).
pub const ENV_CATALOG_PROVIDER: &str = "INSTANCE_CATALOG_PROVIDER";
/// Env var: fixture file used by the `fixture` provider.
pub const ENV_CATALOG_FIXTURE_PATH: &str = "INSTANCE_CATALOG_FIXTURE_PATH";
/// Env var: minimum application log level.
pub const ENV_LOG_LEVEL: &str = "INSTANCE_CATALOG_LOG_LEVEL";
/// Env var: JSON config file to load before env overrides.
pub const ENV_CONFIG_PATH: &str = "INSTANCE_CATALOG_CONFIG";

const ALL_ENV_VARS: [&str; 4] = [
    ENV_CATALOG_PROVIDER,
    ENV_CATALOG_FIXTURE_PATH,
    ENV_LOG_LEVEL,
    ENV_CONFIG_PATH,
];

/// Parsed env overrides. `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppEnv {
    /// Catalog provider override.
    pub catalog_provider: Option<CatalogProviderKind>,
    /// Fixture path override.
    pub catalog_fixture_path: Option<PathBuf>,
    /// Log level override.
    pub log_level: Option<LogLevelSetting>,
    /// Config file location.
    pub config_path: Option<PathBuf>,
}

impl AppEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            catalog_provider: parse_optional_enum(
                map,
                ENV_CATALOG_PROVIDER,
                CatalogProviderKind::parse,
            )?,
            catalog_fixture_path: parse_optional_trimmed_string(map, ENV_CATALOG_FIXTURE_PATH)?
                .map(PathBuf::from),
            log_level: parse_optional_enum(map, ENV_LOG_LEVEL, LogLevelSetting::parse)?,
            config_path: parse_optional_trimmed_string(map, ENV_CONFIG_PATH)?.map(PathBuf::from),
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map = ALL_ENV_VARS
            .iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| ((*name).to_owned(), value))
            })
            .collect();
        Self::from_map(&map)
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: AppConfig,
    env: &AppEnv,
) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(provider) = env.catalog_provider {
        config.catalog.provider = provider;
    }
    if let Some(path) = env.catalog_fixture_path.as_ref() {
        config.catalog.fixture_path = Some(path.clone());
    }
    if let Some(level) = env.log_level {
        config.observability.log_level = level;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Env parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// Variable is set but blank.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Variable holds a value outside the accepted set.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_value(var, &value)),
        }
    }
}

fn redact_value(var: &str, value: &str) -> String {
    if is_secret_key(var) {
        REDACTED.to_owned()
    } else {
        value.to_owned()
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned()))
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some(raw) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    parse(&raw)
        .map(Some)
        .ok_or(EnvParseError::InvalidEnum { var, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn empty_map_overrides_nothing() -> Result<(), Box<dyn Error>> {
        let env = AppEnv::from_map(&BTreeMap::new())?;
        assert_eq!(env, AppEnv::default());

        let config = apply_env_overrides(AppConfig::default(), &env)?;
        assert_eq!(config.as_ref(), &AppConfig::default());
        Ok(())
    }

    #[test]
    fn env_wins_over_base_config() -> Result<(), Box<dyn Error>> {
        let env = AppEnv::from_map(&env_map(&[
            (ENV_CATALOG_PROVIDER, " fixture "),
            (ENV_CATALOG_FIXTURE_PATH, "/tmp/pages.json"),
            (ENV_LOG_LEVEL, "debug"),
        ]))?;

        let config = apply_env_overrides(AppConfig::default(), &env)?;
        assert_eq!(config.catalog.provider, CatalogProviderKind::Fixture);
        assert_eq!(
            config.catalog.fixture_path.as_deref(),
            Some(std::path::Path::new("/tmp/pages.json"))
        );
        assert_eq!(config.observability.log_level, LogLevelSetting::Debug);
        Ok(())
    }

    #[test]
    fn invalid_values_fail_fast() -> Result<(), Box<dyn Error>> {
        let error = AppEnv::from_map(&env_map(&[(ENV_CATALOG_PROVIDER, "gcp")]))
            .err()
            .ok_or("expected env error")?;
        let envelope = ErrorEnvelope::from(error);
        assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_enum"));
        assert_eq!(
            envelope.metadata.get("value").map(String::as_str),
            Some("gcp")
        );

        let blank = AppEnv::from_map(&env_map(&[(ENV_LOG_LEVEL, "  ")]));
        assert_eq!(blank, Err(EnvParseError::EmptyValue { var: ENV_LOG_LEVEL }));
        Ok(())
    }

    #[test]
    fn fixture_provider_without_path_is_rejected() -> Result<(), Box<dyn Error>> {
        let env = AppEnv::from_map(&env_map(&[(ENV_CATALOG_PROVIDER, "fixture")]))?;
        let error = apply_env_overrides(AppConfig::default(), &env)
            .err()
            .ok_or("expected validation error")?;
        assert_eq!(error.code, ErrorCode::new("config", "missing_field"));
        Ok(())
    }
}
