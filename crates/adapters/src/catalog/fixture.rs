//! Fixture-backed catalog adapter.
//!
//! Replays a scripted list of pages. Used by tests and by the CLI when the
//! configured provider is `fixture`.
//!
//! File format:
//!
//! ```json
//! { "pages": [["a1.metal", "t3.micro"], [{ "name": "m5.large", "defaultVcpus": 2 }]],
//!   "failAfterPages": 1 }
//! ```
//!
//! Page entries are either bare names or descriptor objects. When
//! `failAfterPages` is set, enumeration fails once that many pages were
//! delivered.

use instance_catalog_domain::{InstanceTypeDescriptor, InstanceTypeName};
use instance_catalog_ports::{
    BoxFuture, CatalogPage, CatalogPort, CatalogProviderInfo, InstanceTypeQuery, PageFlow,
    PageHandler,
};
use instance_catalog_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureEntry {
    Name(InstanceTypeName),
    Descriptor(InstanceTypeDescriptor),
}

impl From<FixtureEntry> for InstanceTypeDescriptor {
    fn from(entry: FixtureEntry) -> Self {
        match entry {
            FixtureEntry::Name(name) => Self::named(name),
            FixtureEntry::Descriptor(descriptor) => descriptor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FixtureFile {
    pages: Vec<Vec<FixtureEntry>>,
    #[serde(default)]
    fail_after_pages: Option<usize>,
}

/// Catalog that replays fixed pages.
#[derive(Debug)]
pub struct FixtureCatalog {
    provider: CatalogProviderInfo,
    pages: Vec<Vec<InstanceTypeDescriptor>>,
    fail_after_pages: Option<usize>,
    queries: Mutex<Vec<InstanceTypeQuery>>,
}

impl FixtureCatalog {
    /// Build a catalog from descriptor pages.
    #[must_use]
    pub fn new(pages: Vec<Vec<InstanceTypeDescriptor>>) -> Self {
        Self {
            provider: CatalogProviderInfo {
                id: "fixture".into(),
                name: "Fixture catalog".into(),
            },
            pages,
            fail_after_pages: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Build a catalog from pages of names.
    pub fn from_names<P, S>(pages: P) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|name| {
                        InstanceTypeName::parse(name.as_ref())
                            .map(InstanceTypeDescriptor::named)
                            .map_err(ErrorEnvelope::from)
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(pages))
    }

    /// Parse the JSON fixture format.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let file: FixtureFile = serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("fixture", "invalid_fixture"),
                format!("invalid catalog fixture: {error}"),
            )
        })?;
        let pages = file
            .pages
            .into_iter()
            .map(|page| page.into_iter().map(InstanceTypeDescriptor::from).collect())
            .collect();
        Ok(Self::new(pages).failing_after(file.fail_after_pages))
    }

    /// Load a JSON fixture from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|error| {
            ErrorEnvelope::from(error).with_metadata("path", path.display().to_string())
        })?;
        Self::from_json_str(&contents)
            .map_err(|error| error.with_metadata("path", path.display().to_string()))
    }

    /// Fail enumeration once `pages` pages were delivered. `None` never fails.
    #[must_use]
    pub const fn failing_after(mut self, pages: Option<usize>) -> Self {
        self.fail_after_pages = pages;
        self
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Vec<InstanceTypeQuery> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

impl CatalogPort for FixtureCatalog {
    fn provider(&self) -> &CatalogProviderInfo {
        &self.provider
    }

    fn enumerate_instance_types<'a>(
        &'a self,
        ctx: &RequestContext,
        query: InstanceTypeQuery,
        on_page: &'a mut PageHandler<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            if let Ok(mut queries) = self.queries.lock() {
                queries.push(query);
            }

            let total = self.pages.len();
            for (index, page) in self.pages.iter().enumerate() {
                ctx.ensure_not_cancelled("fixture_catalog.page")?;
                if self.fail_after_pages == Some(index) {
                    return Err(fixture_failure(index));
                }
                let page = CatalogPage {
                    instance_types: page.clone(),
                    is_last: index + 1 == total,
                };
                if on_page(page) == PageFlow::Stop {
                    return Ok(());
                }
            }

            // A failure point past the last page still fires, after everything was delivered.
            match self.fail_after_pages {
                Some(after) if after >= total => Err(fixture_failure(total)),
                _ => Ok(()),
            }
        })
    }
}

fn fixture_failure(delivered: usize) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("fixture", "enumeration_failed"),
        format!("fixture catalog failed after {delivered} page(s)"),
        ErrorClass::NonRetriable,
    )
    .with_metadata("pagesDelivered", delivered.to_string())
}
