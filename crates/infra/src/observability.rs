//! Logger and profile telemetry wiring.

use crate::InfraResult;
use instance_catalog_adapters::{
    FileLogSink, JsonLogger, JsonTelemetry, LogSink, StderrLogSink, TaggedTelemetry,
};
use instance_catalog_config::LogLevelSetting;
use instance_catalog_ports::{LogFields, LogLevel, LoggerPort, TelemetryPort, TelemetryTags};
use instance_catalog_shared::RequestContext;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Map the configured level onto the logger port level.
#[must_use]
pub const fn log_level_from_setting(setting: LogLevelSetting) -> LogLevel {
    match setting {
        LogLevelSetting::Debug => LogLevel::Debug,
        LogLevelSetting::Info => LogLevel::Info,
        LogLevelSetting::Warn => LogLevel::Warn,
        LogLevelSetting::Error => LogLevel::Error,
    }
}

/// JSON logger on stderr, tagged with the request correlation id.
#[must_use]
pub fn build_stderr_logger(setting: LogLevelSetting, ctx: &RequestContext) -> Arc<dyn LoggerPort> {
    build_logger(Arc::new(StderrLogSink), setting, ctx)
}

/// JSON logger over an arbitrary sink.
#[must_use]
pub fn build_logger(
    sink: Arc<dyn LogSink>,
    setting: LogLevelSetting,
    ctx: &RequestContext,
) -> Arc<dyn LoggerPort> {
    let mut fields = LogFields::new();
    fields.insert(
        "correlationId".into(),
        Value::String(ctx.correlation_id().as_str().to_owned()),
    );
    Arc::new(
        JsonLogger::new(sink)
            .with_min_level(log_level_from_setting(setting))
            .with_base_fields(fields),
    )
}

/// Telemetry recorder writing the run profile to a file.
///
/// Lines are buffered; call [`ProfileRecorder::finish`] once the run is over.
pub struct ProfileRecorder {
    sink: Arc<FileLogSink>,
    telemetry: Arc<dyn TelemetryPort>,
}

impl ProfileRecorder {
    /// Create (or truncate) the profile file at `path`.
    pub fn create(path: &Path, ctx: &RequestContext) -> InfraResult<Self> {
        let sink = Arc::new(FileLogSink::create(path)?);
        let json: Arc<dyn TelemetryPort> = Arc::new(JsonTelemetry::new(sink.clone()));
        let mut tags = TelemetryTags::new();
        tags.insert("correlationId".into(), ctx.correlation_id().as_str().into());
        Ok(Self {
            sink,
            telemetry: Arc::new(TaggedTelemetry::new(json, tags)),
        })
    }

    /// Telemetry handle to inject into use cases.
    #[must_use]
    pub fn telemetry(&self) -> Arc<dyn TelemetryPort> {
        Arc::clone(&self.telemetry)
    }

    /// Profile file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.sink.path()
    }

    /// Flush buffered records to disk.
    pub fn finish(&self) -> InfraResult<()> {
        self.sink.flush()
    }
}
