//! Instance type descriptors returned by a compute catalog.

use crate::InstanceTypeName;
use serde::{Deserialize, Serialize};

/// One instance type as reported by the catalog.
///
/// Only `name` drives filtering. The remaining fields are informational and
/// are `None` when the provider omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTypeDescriptor {
    /// Identifying name (e.g. `m5.large`).
    pub name: InstanceTypeName,
    /// Default number of vCPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_vcpus: Option<u32>,
    /// Memory size in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mib: Option<u64>,
    /// Whether the type belongs to the current generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_generation: Option<bool>,
}

impl InstanceTypeDescriptor {
    /// Build a descriptor carrying only a name.
    #[must_use]
    pub const fn named(name: InstanceTypeName) -> Self {
        Self {
            name,
            default_vcpus: None,
            memory_mib: None,
            current_generation: None,
        }
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}
