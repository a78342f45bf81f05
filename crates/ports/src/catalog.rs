//! Compute catalog boundary contract.
//!
//! A catalog enumerates instance types page by page. Paging, credentials and
//! transport belong to the adapter; callers only see pages arriving in order
//! through a handler.

use crate::BoxFuture;
use instance_catalog_domain::{InstanceTypeDescriptor, VirtualizationType};
use instance_catalog_shared::{RequestContext, Result};

/// Provider descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProviderInfo {
    /// Stable provider identifier (e.g. `ec2`).
    pub id: Box<str>,
    /// Human-readable provider name.
    pub name: Box<str>,
}

/// Server-side filter applied to an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceTypeQuery {
    /// Only instance types supporting this virtualization type are returned.
    pub virtualization_type: VirtualizationType,
}

impl InstanceTypeQuery {
    /// Query restricted to hardware-virtual-machine instance types.
    #[must_use]
    pub const fn hvm() -> Self {
        Self {
            virtualization_type: VirtualizationType::Hvm,
        }
    }
}

/// One page of enumeration results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogPage {
    /// Descriptors in provider order.
    pub instance_types: Vec<InstanceTypeDescriptor>,
    /// True when no further pages follow.
    pub is_last: bool,
}

/// Handler decision after consuming a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFlow {
    /// Request the next page, if any.
    Continue,
    /// Stop the enumeration; no further pages are requested.
    Stop,
}

/// Callback invoked once per page.
pub type PageHandler<'a> = dyn FnMut(CatalogPage) -> PageFlow + Send + 'a;

/// Boundary contract for instance type catalogs.
pub trait CatalogPort: Send + Sync {
    /// Provider info for this implementation.
    fn provider(&self) -> &CatalogProviderInfo;

    /// Enumerate every instance type matching `query`.
    ///
    /// `on_page` is called once per page, in order, until the provider has no
    /// more pages or the handler returns [`PageFlow::Stop`]. Any failure ends
    /// the enumeration with an error; pages already handed out are not
    /// retracted, so callers that need all-or-nothing must buffer.
    fn enumerate_instance_types<'a>(
        &'a self,
        ctx: &RequestContext,
        query: InstanceTypeQuery,
        on_page: &'a mut PageHandler<'a>,
    ) -> BoxFuture<'a, Result<()>>;
}
