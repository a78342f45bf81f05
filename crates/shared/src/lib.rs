//! # instance-catalog-shared
//!
//! Shared utilities, result types, and error handling for the instance-catalog workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - Result and error envelope types
//! - Request-scoped context with cooperative cancellation
//! - Secret redaction helpers for logs
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Serde-compatible** - Error envelopes serialize for structured logs

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod concurrency;
pub mod errors;
pub mod redaction;
pub mod result;

pub use concurrency::{CancellationToken, CorrelationId, RequestContext};
pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use redaction::{REDACTED, is_secret_key};
pub use result::Result;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::errors::{ErrorClass, ErrorCode, ErrorEnvelope};
    use super::result::Result;

    #[test]
    fn shared_error_types_are_available() {
        let error = ErrorEnvelope::expected(ErrorCode::new("config", "invalid_json"), "invalid");
        assert_eq!(error.kind, super::errors::ErrorKind::Expected);
        assert_eq!(error.class, ErrorClass::NonRetriable);
    }

    #[test]
    fn shared_result_type_is_available() {
        let value: Result<i32> = Ok(5);
        assert!(matches!(value.map(|value| value + 1), Ok(6)));
    }
}
