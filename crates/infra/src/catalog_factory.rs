//! Catalog adapter selection.

use crate::InfraResult;
#[cfg(feature = "ec2")]
use instance_catalog_adapters::Ec2Catalog;
use instance_catalog_adapters::FixtureCatalog;
use instance_catalog_config::{CatalogConfig, CatalogProviderKind};
use instance_catalog_ports::CatalogPort;
use instance_catalog_shared::{ErrorCode, ErrorEnvelope};
use std::sync::Arc;

/// Build the catalog port selected by `config.provider`.
///
/// The EC2 client picks up region and credentials from the ambient AWS
/// configuration; nothing here is cached between calls.
pub async fn build_catalog_port(config: &CatalogConfig) -> InfraResult<Arc<dyn CatalogPort>> {
    match config.provider {
        CatalogProviderKind::Ec2 => build_ec2_catalog().await,
        CatalogProviderKind::Fixture => {
            let path = config.fixture_path.as_deref().ok_or_else(|| {
                ErrorEnvelope::expected(
                    ErrorCode::new("config", "missing_field"),
                    "catalog.fixturePath is required for the fixture provider",
                )
                .with_metadata("field", "catalog.fixturePath")
            })?;
            tracing::debug!(path = %path.display(), "loading catalog fixture");
            let catalog = FixtureCatalog::load(path)?;
            Ok(Arc::new(catalog))
        },
    }
}

#[cfg(feature = "ec2")]
async fn build_ec2_catalog() -> InfraResult<Arc<dyn CatalogPort>> {
    Ok(Arc::new(Ec2Catalog::from_env().await))
}

#[cfg(not(feature = "ec2"))]
async fn build_ec2_catalog() -> InfraResult<Arc<dyn CatalogPort>> {
    Err(provider_unavailable(CatalogProviderKind::Ec2))
}

#[cfg(not(feature = "ec2"))]
fn provider_unavailable(kind: CatalogProviderKind) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("infra", "provider_unavailable"),
        format!("catalog provider `{}` is not compiled in", kind.as_str()),
    )
    .with_metadata("provider", kind.as_str())
}
