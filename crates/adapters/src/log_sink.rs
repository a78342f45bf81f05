//! Log sink helpers for observability adapters.

use instance_catalog_shared::{ErrorCode, ErrorEnvelope, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A sink that receives pre-formatted log lines.
pub trait LogSink: Send + Sync {
    /// Write a line to the sink.
    fn write_line(&self, line: &str);

    /// Flush buffered lines. Sinks without buffering keep the default no-op.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Log sink that writes to stderr.
#[derive(Debug, Default)]
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr();
        if let Err(error) = stderr.write_all(line.as_bytes()) {
            eprintln!("log sink write failed: {error}");
        }
    }
}

/// Log sink that appends lines to a file, truncating it on creation.
///
/// Used for the `--cpuprofile` output.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileLogSink {
    /// Create (or truncate) `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|error| {
            ErrorEnvelope::from(error)
                .with_metadata("path", path.display().to_string())
                .with_metadata("operation", "log_sink.create")
        })?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn write_line(&self, line: &str) {
        let Ok(mut writer) = self.writer.lock() else {
            eprintln!("log sink lock poisoned: {}", self.path.display());
            return;
        };
        if let Err(error) = writer.write_all(line.as_bytes()) {
            eprintln!("log sink write failed: {error}");
        }
    }

    fn flush(&self) -> Result<()> {
        let mut writer = self.writer.lock().map_err(|_| {
            ErrorEnvelope::invariant(ErrorCode::internal(), "log sink lock poisoned")
                .with_metadata("path", self.path.display().to_string())
        })?;
        writer.flush().map_err(|error| {
            ErrorEnvelope::from(error).with_metadata("path", self.path.display().to_string())
        })
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    /// Drain captured lines.
    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl LogSink for MemoryLogSink {
    fn write_line(&self, line: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(line.to_string());
        }
    }
}
