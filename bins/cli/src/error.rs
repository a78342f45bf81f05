use instance_catalog_shared::{ErrorCode, ErrorEnvelope, ErrorKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Internal = 1,
    InvalidInput = 2,
    Io = 3,
    CatalogFetch = 4,
    Interrupted = 130,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exit code for a failure reported by the run.
    #[must_use]
    pub fn for_envelope(error: &ErrorEnvelope) -> Self {
        if error.code == ErrorCode::new("catalog", "fetch_failed") {
            return Self::CatalogFetch;
        }
        if error.is_cancelled() {
            return Self::Interrupted;
        }
        if error.kind == ErrorKind::Expected {
            return Self::InvalidInput;
        }
        if error.code.is_io() {
            return Self::Io;
        }
        Self::Internal
    }
}

#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) => ExitCode::Io,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(formatter, "io error: {error}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
