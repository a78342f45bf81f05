//! Domain primitives with validated constructors.

use instance_catalog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `InstanceTypeName` is empty after trimming.
    EmptyInstanceTypeName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `InstanceTypeName` contains whitespace.
    InvalidInstanceTypeName {
        /// Trimmed name that failed validation.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyInstanceTypeName { .. } | Self::InvalidInstanceTypeName { .. } => {
                ErrorCode::new("domain", "invalid_instance_type_name")
            },
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInstanceTypeName { .. } => {
                formatter.write_str("InstanceTypeName must be non-empty")
            },
            Self::InvalidInstanceTypeName { .. } => {
                formatter.write_str("InstanceTypeName must not contain whitespace")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);
        match error {
            PrimitiveError::EmptyInstanceTypeName { input_length } => {
                envelope.with_metadata("inputLength", input_length.to_string())
            },
            PrimitiveError::InvalidInstanceTypeName { input } => {
                envelope.with_metadata("input", input)
            },
        }
    }
}

/// Identifying name of an instance type (e.g. `t3.micro`).
///
/// Names are trimmed and must be non-empty with no inner whitespace. No
/// family/size grammar is enforced: providers add families faster than a
/// hard-coded grammar could track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceTypeName(Box<str>);

impl InstanceTypeName {
    /// Parse an instance type name.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PrimitiveError::EmptyInstanceTypeName {
                input_length: raw.len(),
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(PrimitiveError::InvalidInstanceTypeName {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.into()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceTypeName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceTypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InstanceTypeName {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<InstanceTypeName> for String {
    fn from(value: InstanceTypeName) -> Self {
        value.0.into_string()
    }
}

/// Virtualization type the catalog is filtered on. Listings only ever ask
/// for `hvm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualizationType {
    /// Hardware virtual machine.
    Hvm,
}

impl VirtualizationType {
    /// Wire value used by the provider's filter syntax.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hvm => "hvm",
        }
    }
}

impl fmt::Display for VirtualizationType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_type_name_trims_input() -> Result<(), PrimitiveError> {
        let name = InstanceTypeName::parse("  a1.metal ")?;
        assert_eq!(name.as_str(), "a1.metal");
        Ok(())
    }

    #[test]
    fn instance_type_name_rejects_blank_and_spaced_input() {
        assert_eq!(
            InstanceTypeName::parse("   "),
            Err(PrimitiveError::EmptyInstanceTypeName { input_length: 3 })
        );
        assert!(matches!(
            InstanceTypeName::parse("t3 micro"),
            Err(PrimitiveError::InvalidInstanceTypeName { .. })
        ));
    }

    #[test]
    fn primitive_errors_map_to_envelopes() {
        let envelope = ErrorEnvelope::from(PrimitiveError::InvalidInstanceTypeName {
            input: "t3 micro".to_owned(),
        });
        assert_eq!(
            envelope.code,
            ErrorCode::new("domain", "invalid_instance_type_name")
        );
        assert_eq!(
            envelope.metadata.get("input").map(String::as_str),
            Some("t3 micro")
        );
    }

    #[test]
    fn virtualization_type_uses_wire_value() {
        assert_eq!(VirtualizationType::Hvm.as_str(), "hvm");
        assert_eq!(VirtualizationType::Hvm.to_string(), "hvm");
    }
}
