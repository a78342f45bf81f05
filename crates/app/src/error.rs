//! Errors raised by the catalog filter.

use instance_catalog_shared::{ErrorCode, ErrorEnvelope};

/// Failure of the instance catalog filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogFilterError {
    /// An exclude entry cannot be compiled. Raised at construction, before
    /// any catalog call.
    #[error("invalid exclude entry `{entry}`: {reason}")]
    Configuration {
        /// Offending entry as configured.
        entry: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The catalog enumeration failed (network, auth, throttling, malformed
    /// response, or cancellation). No partial results are kept.
    #[error("unable to fetch instance types: {source}")]
    CatalogFetch {
        /// Underlying failure reported by the catalog adapter.
        #[source]
        source: ErrorEnvelope,
    },
}

impl CatalogFilterError {
    pub(crate) fn configuration(entry: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            entry: entry.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) const fn fetch(source: ErrorEnvelope) -> Self {
        Self::CatalogFetch { source }
    }

    /// Returns true when the fetch failed because the request was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::CatalogFetch { source } if source.is_cancelled())
    }
}

impl From<CatalogFilterError> for ErrorEnvelope {
    fn from(error: CatalogFilterError) -> Self {
        let message = error.to_string();
        match error {
            CatalogFilterError::Configuration { entry, reason } => Self::expected(
                ErrorCode::new("catalog", "invalid_exclude_entry"),
                message,
            )
            .with_metadata("entry", entry)
            .with_metadata("reason", reason),
            CatalogFilterError::CatalogFetch { source } => {
                if source.is_cancelled() {
                    return source;
                }
                let mut envelope = Self::unexpected(
                    ErrorCode::new("catalog", "fetch_failed"),
                    message,
                    source.class,
                )
                .with_metadata("causeCode", source.code.to_string());
                for (key, value) in source.metadata {
                    envelope.metadata.entry(key).or_insert(value);
                }
                envelope
            },
        }
    }
}
