//! Application configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims entries but keeps their configured order.

use instance_catalog_domain::{EmptyExcludePolicy, ExcludeList, ExcludeMatchMode};
use instance_catalog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Instance types excluded when no list is configured.
pub const DEFAULT_EXCLUDE_LIST: [&str; 6] = [
    "a1.metal",
    "a1.medium",
    "a1.large",
    "a1.xlarge",
    "a1.2xlarge",
    "a1.4xlarge",
];

const EXCLUDE_LIST_MAX: usize = 1_024;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct AppConfig {
    /// Catalog source and filtering.
    pub catalog: CatalogConfig,
    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedAppConfig, ConfigSchemaError> {
        self.catalog.normalize();
        self.catalog.validate()?;
        Ok(ValidatedAppConfig { raw: self })
    }
}

/// Validated config wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAppConfig {
    raw: AppConfig,
}

impl ValidatedAppConfig {
    /// Exclude list as a domain value.
    #[must_use]
    pub fn exclude_list(&self) -> ExcludeList {
        ExcludeList::from(self.raw.catalog.exclude_list.clone())
    }
}

impl AsRef<AppConfig> for ValidatedAppConfig {
    fn as_ref(&self) -> &AppConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedAppConfig {
    type Target = AppConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse an application config from a JSON string, applying validation and normalization.
pub fn parse_app_config_json(input: &str) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let config: AppConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Where instance types come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CatalogProviderKind {
    /// EC2 `DescribeInstanceTypes`, credentials from the ambient AWS config.
    #[default]
    Ec2,
    /// Pages replayed from a JSON file (see `catalog.fixturePath`).
    Fixture,
}

impl CatalogProviderKind {
    /// Return the canonical config string for this provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ec2 => "ec2",
            Self::Fixture => "fixture",
        }
    }

    /// Parse a provider from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "ec2" | "aws" => Some(Self::Ec2),
            "fixture" => Some(Self::Fixture),
            _ => None,
        }
    }
}

impl fmt::Display for CatalogProviderKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CatalogConfig {
    /// Catalog provider.
    pub provider: CatalogProviderKind,
    /// Fixture file, required when `provider` is `fixture`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_path: Option<PathBuf>,
    /// Instance types to drop from listings, in configured order.
    pub exclude_list: Vec<Box<str>>,
    /// How entries are compared.
    pub match_mode: ExcludeMatchMode,
    /// Answer when `exclude_list` is empty.
    pub empty_exclude_policy: EmptyExcludePolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            provider: CatalogProviderKind::default(),
            fixture_path: None,
            exclude_list: DEFAULT_EXCLUDE_LIST.iter().copied().map(Box::from).collect(),
            match_mode: ExcludeMatchMode::default(),
            empty_exclude_policy: EmptyExcludePolicy::default(),
        }
    }
}

impl CatalogConfig {
    fn normalize(&mut self) {
        for entry in &mut self.exclude_list {
            let trimmed = entry.trim();
            if trimmed.len() != entry.len() {
                *entry = trimmed.into();
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if self.exclude_list.len() > EXCLUDE_LIST_MAX {
            return Err(ConfigSchemaError::ListTooLarge {
                section: "catalog",
                field: "excludeList",
                len: self.exclude_list.len(),
                max: EXCLUDE_LIST_MAX,
            });
        }

        for (index, entry) in self.exclude_list.iter().enumerate() {
            if entry.is_empty() {
                return Err(ConfigSchemaError::InvalidExcludeEntry {
                    index,
                    entry: entry.to_string(),
                    reason: "entry must be non-empty",
                });
            }
            if self.match_mode == ExcludeMatchMode::Exact && entry.chars().any(char::is_whitespace)
            {
                return Err(ConfigSchemaError::InvalidExcludeEntry {
                    index,
                    entry: entry.to_string(),
                    reason: "exact entries must not contain whitespace",
                });
            }
        }

        match (&self.provider, &self.fixture_path) {
            (CatalogProviderKind::Fixture, None) => Err(ConfigSchemaError::MissingField {
                section: "catalog",
                field: "fixturePath",
                reason: "required when provider is fixture",
            }),
            (_, Some(path)) if path.as_os_str().is_empty() => {
                Err(ConfigSchemaError::MissingField {
                    section: "catalog",
                    field: "fixturePath",
                    reason: "path must be non-empty",
                })
            },
            _ => Ok(()),
        }
    }
}

/// Minimum severity for application log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevelSetting {
    /// Debug and above.
    Debug,
    /// Info and above.
    Info,
    /// Warnings and errors.
    #[default]
    Warn,
    /// Errors only.
    Error,
}

impl LogLevelSetting {
    /// Return the canonical config string for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parse a level from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevelSetting {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ObservabilityConfig {
    /// Minimum level written by the JSON logger.
    pub log_level: LogLevelSetting,
}

/// Schema-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// A list field exceeds the maximum allowed size.
    ListTooLarge {
        /// Schema section (e.g. `catalog`).
        section: &'static str,
        /// Field name in the config file (e.g. `excludeList`).
        field: &'static str,
        /// Number of entries.
        len: usize,
        /// Maximum allowed number of entries.
        max: usize,
    },
    /// An exclude entry is invalid for the configured match mode.
    InvalidExcludeEntry {
        /// Position in `catalog.excludeList`.
        index: usize,
        /// Entry after trimming.
        entry: String,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A field required by another setting is missing or blank.
    MissingField {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::ListTooLarge { .. } => ErrorCode::new("config", "list_too_large"),
            Self::InvalidExcludeEntry { .. } => ErrorCode::new("config", "invalid_exclude_entry"),
            Self::MissingField { .. } => ErrorCode::new("config", "missing_field"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListTooLarge {
                section,
                field,
                len,
                max,
            } => write!(
                formatter,
                "{section}.{field} must have at most {max} entries (got {len})"
            ),
            Self::InvalidExcludeEntry {
                index,
                entry,
                reason,
            } => write!(
                formatter,
                "catalog.excludeList[{index}] `{entry}` is invalid: {reason}"
            ),
            Self::MissingField {
                section,
                field,
                reason,
            } => write!(formatter, "{section}.{field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::ListTooLarge {
                section,
                field,
                len,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::InvalidExcludeEntry { index, entry, .. } => envelope
                .with_metadata("section", "catalog")
                .with_metadata("field", "excludeList")
                .with_metadata("index", index.to_string())
                .with_metadata("entry", entry),
            ConfigSchemaError::MissingField { section, field, .. } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn defaults_are_applied() -> Result<(), Box<dyn Error>> {
        let config = parse_app_config_json("{}")?;

        assert_eq!(config.catalog, CatalogConfig::default());
        assert_eq!(config.catalog.provider, CatalogProviderKind::Ec2);
        assert_eq!(config.catalog.match_mode, ExcludeMatchMode::Exact);
        assert_eq!(
            config.catalog.empty_exclude_policy,
            EmptyExcludePolicy::ExcludeAll
        );
        assert_eq!(config.observability.log_level, LogLevelSetting::Warn);

        let list = config.exclude_list();
        let entries: Vec<&str> = list.iter().collect();
        assert_eq!(entries, DEFAULT_EXCLUDE_LIST.to_vec());
        Ok(())
    }

    #[test]
    fn entries_are_trimmed_in_order() -> Result<(), Box<dyn Error>> {
        let payload = serde_json::json!({
            "catalog": { "excludeList": [" t3.micro ", "a1.metal"] }
        });
        let config = parse_app_config_json(&payload.to_string())?;
        let entries: Vec<&str> = config.catalog.exclude_list.iter().map(AsRef::as_ref).collect();
        assert_eq!(entries, vec!["t3.micro", "a1.metal"]);
        Ok(())
    }

    #[test]
    fn empty_list_is_accepted() -> Result<(), Box<dyn Error>> {
        let payload = serde_json::json!({
            "catalog": { "excludeList": [], "emptyExcludePolicy": "excludeNone" }
        });
        let config = parse_app_config_json(&payload.to_string())?;
        assert!(config.exclude_list().is_empty());
        assert_eq!(
            config.catalog.empty_exclude_policy,
            EmptyExcludePolicy::ExcludeNone
        );
        Ok(())
    }

    #[test]
    fn invalid_entries_report_index() -> Result<(), Box<dyn Error>> {
        let payload = serde_json::json!({
            "catalog": { "excludeList": ["a1.metal", "a1 large"] }
        });
        let error = parse_app_config_json(&payload.to_string())
            .err()
            .ok_or("expected validation error")?;
        assert_eq!(error.code, ErrorCode::new("config", "invalid_exclude_entry"));
        assert_eq!(error.metadata.get("index").map(String::as_str), Some("1"));

        let blank = serde_json::json!({ "catalog": { "excludeList": ["   "] } });
        assert!(parse_app_config_json(&blank.to_string()).is_err());
        Ok(())
    }

    #[test]
    fn pattern_mode_allows_spaces_in_entries() -> Result<(), Box<dyn Error>> {
        let payload = serde_json::json!({
            "catalog": { "matchMode": "pattern", "excludeList": ["(?x) a1 \\. .*"] }
        });
        let config = parse_app_config_json(&payload.to_string())?;
        assert_eq!(config.catalog.match_mode, ExcludeMatchMode::Pattern);
        Ok(())
    }

    #[test]
    fn fixture_provider_requires_a_path() -> Result<(), Box<dyn Error>> {
        let payload = serde_json::json!({ "catalog": { "provider": "fixture" } });
        let error = parse_app_config_json(&payload.to_string())
            .err()
            .ok_or("expected validation error")?;
        assert_eq!(error.code, ErrorCode::new("config", "missing_field"));
        assert_eq!(
            error.metadata.get("field").map(String::as_str),
            Some("fixturePath")
        );
        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = parse_app_config_json(r#"{"catalog": {"region": "us-east-1"}}"#);
        assert!(matches!(
            result,
            Err(ref error) if error.code == ErrorCode::new("config", "invalid_json")
        ));
    }

    #[test]
    fn list_size_is_capped() -> Result<(), Box<dyn Error>> {
        let entries: Vec<String> = (0..=EXCLUDE_LIST_MAX).map(|i| format!("t{i}.micro")).collect();
        let payload = serde_json::json!({ "catalog": { "excludeList": entries } });
        let error = parse_app_config_json(&payload.to_string())
            .err()
            .ok_or("expected validation error")?;
        assert_eq!(error.code, ErrorCode::new("config", "list_too_large"));
        Ok(())
    }

    #[test]
    fn parses_provider_and_level_aliases() {
        assert_eq!(CatalogProviderKind::parse(" EC2 "), Some(CatalogProviderKind::Ec2));
        assert_eq!(
            CatalogProviderKind::parse("fixture"),
            Some(CatalogProviderKind::Fixture)
        );
        assert_eq!(CatalogProviderKind::parse("gcp"), None);
        assert_eq!(LogLevelSetting::parse("WARNING"), Some(LogLevelSetting::Warn));
        assert_eq!(LogLevelSetting::parse("loud"), None);
    }
}
