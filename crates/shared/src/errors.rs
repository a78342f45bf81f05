//! Error envelope shared by every crate in the workspace.
//!
//! An envelope carries where the failure came from ([`ErrorKind`]), whether
//! the caller may retry ([`ErrorClass`]), a namespaced [`ErrorCode`] such as
//! `catalog:fetch_failed`, a message, and string metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, io};

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// Where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Bad configuration, bad input, or cancellation.
    Expected,
    /// A broken internal assumption.
    Invariant,
    /// I/O, the cloud API, or anything else outside our control.
    Unexpected,
}

impl ErrorKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Invariant => "invariant",
            Self::Unexpected => "unexpected",
        }
    }
}

/// Retry hint reported with every failure. Nothing in this workspace retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorClass {
    /// Trying again later may succeed (throttling, timeouts, outages).
    Retriable,
    /// Trying again will fail the same way.
    NonRetriable,
}

impl ErrorClass {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retriable => "retriable",
            Self::NonRetriable => "non-retriable",
        }
    }
}

const CORE: &str = "core";

/// Error code rendered (and serialized) as `namespace:code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a code in `namespace`.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// `core:cancelled`.
    pub fn cancelled() -> Self {
        Self::new(CORE, "cancelled")
    }

    /// `core:internal`.
    pub fn internal() -> Self {
        Self::new(CORE, "internal")
    }

    /// `core:io`, the catch-all for local I/O failures.
    pub fn io() -> Self {
        Self::new(CORE, "io")
    }

    /// Returns true for the codes produced from a local [`io::Error`].
    #[must_use]
    pub fn is_io(&self) -> bool {
        self.namespace == CORE
            && matches!(
                self.code.as_str(),
                "io" | "not_found" | "permission_denied" | "timeout"
            )
    }

    fn from_io_kind(kind: io::ErrorKind) -> Self {
        let code = match kind {
            io::ErrorKind::NotFound => "not_found",
            io::ErrorKind::PermissionDenied => "permission_denied",
            io::ErrorKind::TimedOut => "timeout",
            io::ErrorKind::Interrupted => "cancelled",
            _ => "io",
        };
        Self::new(CORE, code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.split_once(':') {
            Some((namespace, code)) if !namespace.is_empty() && !code.is_empty() => {
                Ok(Self::new(namespace, code))
            },
            _ => Err(format!("error code `{value}` is not `namespace:code`")),
        }
    }
}

/// Structured error shared across crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Origin of the failure.
    pub kind: ErrorKind,
    /// Retry hint.
    pub class: ErrorClass,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Diagnostic key/value pairs (paths, operations, upstream codes).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    fn build(kind: ErrorKind, class: ErrorClass, code: ErrorCode, message: String) -> Self {
        Self {
            kind,
            class,
            code,
            message,
            metadata: ErrorMetadata::new(),
        }
    }

    /// Expected failure; never retriable.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(
            ErrorKind::Expected,
            ErrorClass::NonRetriable,
            code,
            message.into(),
        )
    }

    /// Broken internal assumption; never retriable.
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(
            ErrorKind::Invariant,
            ErrorClass::NonRetriable,
            code,
            message.into(),
        )
    }

    /// Failure outside our control, with an explicit retry hint.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self::build(ErrorKind::Unexpected, class, code, message.into())
    }

    /// The request was cancelled before it finished.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::expected(ErrorCode::cancelled(), message)
    }

    /// Returns true if the error represents a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::cancelled()
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} {} {}: {}",
            self.kind.as_str(),
            self.class.as_str(),
            self.code,
            self.message
        )
    }
}

impl std::error::Error for ErrorEnvelope {}

impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        let kind = error.kind();
        let class = if matches!(
            kind,
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
        ) {
            ErrorClass::Retriable
        } else {
            ErrorClass::NonRetriable
        };
        Self::unexpected(ErrorCode::from_io_kind(kind), error.to_string(), class)
    }
}
