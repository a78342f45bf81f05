//! Integration tests for config files and env maps kept under `fixtures/`.

use instance_catalog_config::{
    AppConfig, AppEnv, CatalogProviderKind, LogLevelSetting, apply_env_overrides,
    load_app_config_from_path, load_app_config_from_sources,
};
use instance_catalog_shared::ErrorCode;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};

fn fixture_path(relative: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map_or_else(|| manifest_dir.to_path_buf(), Path::to_path_buf)
        .join("fixtures")
        .join(relative)
}

#[test]
fn valid_config_file_loads_and_normalizes() -> Result<(), Box<dyn Error>> {
    let path = fixture_path("config/app-config.valid.json");
    let config = load_app_config_from_path(Some(&path), &AppEnv::default())?;

    assert_eq!(config.catalog.provider, CatalogProviderKind::Fixture);
    assert_eq!(config.observability.log_level, LogLevelSetting::Info);
    let list = config.exclude_list();
    let entries: Vec<&str> = list.iter().collect();
    assert_eq!(entries, vec!["a1.metal", "a1.medium"]);
    Ok(())
}

#[test]
fn invalid_entry_file_is_rejected() -> Result<(), Box<dyn Error>> {
    let path = fixture_path("config/app-config.invalid-entry.json");
    let error = load_app_config_from_path(Some(&path), &AppEnv::default())
        .err()
        .ok_or("expected validation error")?;
    assert_eq!(error.code, ErrorCode::new("config", "invalid_exclude_entry"));
    assert_eq!(error.metadata.get("entry").map(String::as_str), Some("a1 medium"));
    Ok(())
}

#[test]
fn env_fixture_merges_into_defaults() -> Result<(), Box<dyn Error>> {
    let contents = std::fs::read_to_string(fixture_path("env/app-env.valid.json"))?;
    let map: BTreeMap<String, String> = serde_json::from_str(&contents)?;
    let env = AppEnv::from_map(&map)?;

    let config = apply_env_overrides(AppConfig::default(), &env)?;
    assert_eq!(config.catalog.provider, CatalogProviderKind::Fixture);
    assert_eq!(config.observability.log_level, LogLevelSetting::Error);
    assert_eq!(config.exclude_list().len(), 6);
    Ok(())
}

#[test]
fn env_never_touches_the_exclude_list() -> Result<(), Box<dyn Error>> {
    let mut map = BTreeMap::new();
    map.insert(
        "INSTANCE_CATALOG_EXCLUDE_LIST".to_owned(),
        "t3.micro".to_owned(),
    );
    let env = AppEnv::from_map(&map)?;

    let config = load_app_config_from_sources(Some(r#"{"catalog": {"excludeList": []}}"#), &env)?;
    assert!(config.exclude_list().is_empty());
    Ok(())
}
