//! Config loading helpers (file + env).
//!
//! Precedence (highest wins):
//! - env overrides (`AppEnv`)
//! - config JSON (file content)
//! - defaults (`AppConfig::default()`)

use crate::{AppConfig, AppEnv, ValidatedAppConfig, apply_env_overrides};
use instance_catalog_shared::{ErrorCode, ErrorEnvelope};
use std::path::Path;

/// Load the config from optional JSON text and env overrides.
pub fn load_app_config_from_sources(
    config_json: Option<&str>,
    env: &AppEnv,
) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let config = match config_json {
        None => AppConfig::default(),
        Some(input) => parse_config_unvalidated(input)?,
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the config from an optional file path and env overrides.
pub fn load_app_config_from_path(
    config_path: Option<&Path>,
    env: &AppEnv,
) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let config_text = match config_path {
        None => None,
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            Some(read_config_file(path)?)
        },
    };
    load_app_config_from_sources(config_text.as_deref(), env)
}

/// Load the config from the process environment. `INSTANCE_CATALOG_CONFIG`
/// names an optional JSON file applied beneath the env overrides.
pub fn load_app_config_std_env() -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let env = AppEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_app_config_from_path(env.config_path.as_deref(), &env)
}

fn parse_config_unvalidated(input: &str) -> Result<AppConfig, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
        .with_metadata("source", "config")
    })
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "read_failed"),
            format!("failed to read config file: {error}"),
        )
        .with_metadata("path", path.display().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogProviderKind;
    use instance_catalog_domain::ExcludeMatchMode;
    use std::error::Error;

    #[test]
    fn file_values_sit_beneath_env() -> Result<(), Box<dyn Error>> {
        let config_json = r#"{
            "catalog": {
                "provider": "fixture",
                "fixturePath": "/srv/pages.json",
                "matchMode": "pattern",
                "excludeList": ["a1\\..*"]
            }
        }"#;
        let env = AppEnv {
            catalog_fixture_path: Some("/tmp/override.json".into()),
            ..AppEnv::default()
        };

        let config = load_app_config_from_sources(Some(config_json), &env)?;
        assert_eq!(config.catalog.provider, CatalogProviderKind::Fixture);
        assert_eq!(config.catalog.match_mode, ExcludeMatchMode::Pattern);
        assert_eq!(
            config.catalog.fixture_path.as_deref(),
            Some(Path::new("/tmp/override.json"))
        );
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() -> Result<(), Box<dyn Error>> {
        let path = std::env::temp_dir().join("instance-catalog-absent-config.json");
        let error = load_app_config_from_path(Some(&path), &AppEnv::default())
            .err()
            .ok_or("expected read error")?;
        assert_eq!(error.code, ErrorCode::new("config", "read_failed"));
        assert!(error.metadata.contains_key("path"));
        Ok(())
    }
}
