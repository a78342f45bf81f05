//! JSON telemetry adapter (counters, timers, and spans).
//!
//! Output is one JSON object per line. `start_timer` emits a span `start`
//! record immediately; `stop` emits the timer metric followed by the span
//! `end` record carrying `durationMs`.

use crate::log_sink::LogSink;
use crate::logger::now_epoch_ms;
use instance_catalog_ports::{TelemetryPort, TelemetryTags, TelemetryTimer};
use instance_catalog_shared::redaction::{REDACTED, is_secret_key};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Telemetry adapter that emits JSON lines.
#[derive(Clone)]
pub struct JsonTelemetry {
    sink: Arc<dyn LogSink>,
    base_tags: TelemetryTags,
    next_span_id: Arc<AtomicU64>,
}

impl JsonTelemetry {
    /// Create a telemetry adapter backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_tags: TelemetryTags::new(),
            next_span_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Set base tags applied to every metric.
    #[must_use]
    pub fn with_base_tags(mut self, tags: TelemetryTags) -> Self {
        self.base_tags = tags;
        self
    }
}

impl TelemetryPort for JsonTelemetry {
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        let tags = merge_tags(&self.base_tags, tags);
        let payload = metric_payload("counter", name, value, None, &tags);
        self.sink.write_line(&payload);
    }

    fn record_timer_ms(&self, name: &str, duration_ms: u64, tags: Option<&TelemetryTags>) {
        let tags = merge_tags(&self.base_tags, tags);
        let payload = metric_payload("timer", name, duration_ms, Some("ms"), &tags);
        self.sink.write_line(&payload);
    }

    fn start_timer(&self, name: &str, tags: Option<&TelemetryTags>) -> Box<dyn TelemetryTimer> {
        let tags = merge_tags(&self.base_tags, tags);
        let span_id = self.next_span_id.fetch_add(1, Ordering::Relaxed);
        self.sink
            .write_line(&span_payload("start", name, None, span_id, &tags));
        Box::new(JsonTelemetryTimer {
            sink: Arc::clone(&self.sink),
            name: name.into(),
            tags,
            span_id,
            started_at: Instant::now(),
            stopped: AtomicBool::new(false),
        })
    }
}

/// Telemetry adapter that applies base tags to an inner telemetry sink.
#[derive(Clone)]
pub struct TaggedTelemetry {
    inner: Arc<dyn TelemetryPort>,
    tags: TelemetryTags,
}

impl TaggedTelemetry {
    /// Wrap a telemetry sink with base tags.
    #[must_use]
    pub fn new(inner: Arc<dyn TelemetryPort>, tags: TelemetryTags) -> Self {
        Self { inner, tags }
    }
}

impl TelemetryPort for TaggedTelemetry {
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        let merged = merge_tags(&self.tags, tags);
        self.inner.increment_counter(name, value, Some(&merged));
    }

    fn record_timer_ms(&self, name: &str, duration_ms: u64, tags: Option<&TelemetryTags>) {
        let merged = merge_tags(&self.tags, tags);
        self.inner.record_timer_ms(name, duration_ms, Some(&merged));
    }

    fn start_timer(&self, name: &str, tags: Option<&TelemetryTags>) -> Box<dyn TelemetryTimer> {
        let merged = merge_tags(&self.tags, tags);
        self.inner.start_timer(name, Some(&merged))
    }
}

struct JsonTelemetryTimer {
    sink: Arc<dyn LogSink>,
    name: Box<str>,
    tags: TelemetryTags,
    span_id: u64,
    started_at: Instant,
    stopped: AtomicBool,
}

impl TelemetryTimer for JsonTelemetryTimer {
    fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let duration_ms = u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or_default();

        let metric = metric_payload("timer", &self.name, duration_ms, Some("ms"), &self.tags);
        self.sink.write_line(&metric);
        let span = span_payload(
            "end",
            &self.name,
            Some(duration_ms),
            self.span_id,
            &self.tags,
        );
        self.sink.write_line(&span);
    }
}

fn metric_payload(
    metric_type: &str,
    name: &str,
    value: u64,
    unit: Option<&str>,
    tags: &TelemetryTags,
) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert("type".to_string(), Value::String("metric".to_string()));
    payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
    payload.insert(
        "metricType".to_string(),
        Value::String(metric_type.to_string()),
    );
    payload.insert("name".to_string(), Value::String(name.to_string()));
    payload.insert("value".to_string(), Value::from(value));
    if let Some(unit) = unit {
        payload.insert("unit".to_string(), Value::String(unit.to_string()));
    }
    if !tags.is_empty() {
        payload.insert("tags".to_string(), tags_to_json(tags));
    }
    to_line(payload)
}

fn span_payload(
    event: &str,
    name: &str,
    duration_ms: Option<u64>,
    span_id: u64,
    tags: &TelemetryTags,
) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert("type".to_string(), Value::String("span".to_string()));
    payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
    payload.insert("event".to_string(), Value::String(event.to_string()));
    payload.insert("name".to_string(), Value::String(name.to_string()));
    payload.insert("spanId".to_string(), Value::from(span_id));
    if let Some(duration_ms) = duration_ms {
        payload.insert("durationMs".to_string(), Value::from(duration_ms));
    }
    if !tags.is_empty() {
        payload.insert("tags".to_string(), tags_to_json(tags));
    }
    to_line(payload)
}

fn to_line(payload: serde_json::Map<String, Value>) -> String {
    serde_json::to_string(&Value::Object(payload)).map_or_else(
        |_| {
            "{\"type\":\"metric\",\"metricType\":\"error\",\"name\":\"telemetry.serialize_failed\",\"value\":1}\n"
                .to_string()
        },
        |mut encoded| {
            encoded.push('\n');
            encoded
        },
    )
}

fn merge_tags(base: &TelemetryTags, extra: Option<&TelemetryTags>) -> TelemetryTags {
    let mut merged = base.clone();
    if let Some(extra) = extra {
        merged.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    for (key, value) in &mut merged {
        if is_secret_key(key) {
            *value = REDACTED.into();
        }
    }
    merged
}

fn tags_to_json(tags: &TelemetryTags) -> Value {
    let map = tags
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use std::sync::Mutex;

    fn parse_lines(sink: &MemoryLogSink) -> Result<Vec<Value>, serde_json::Error> {
        sink.take()
            .iter()
            .map(|line| serde_json::from_str(line.trim()))
            .collect()
    }

    #[test]
    fn telemetry_emits_counter_and_timer_with_span() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::default());
        let telemetry = JsonTelemetry::new(sink.clone());

        telemetry.increment_counter("catalog.listIncluded.pages", 2, None);
        let timer = telemetry.start_timer("catalog.listIncluded.total", None);
        timer.stop();
        timer.stop();

        let parsed = parse_lines(&sink)?;
        assert_eq!(parsed.len(), 4);

        let counter = &parsed[0];
        assert_eq!(counter.get("metricType"), Some(&Value::from("counter")));
        assert_eq!(counter.get("value"), Some(&Value::from(2)));

        assert_eq!(parsed[1].get("type"), Some(&Value::from("span")));
        assert_eq!(parsed[1].get("event"), Some(&Value::from("start")));
        assert_eq!(parsed[2].get("metricType"), Some(&Value::from("timer")));
        assert_eq!(parsed[3].get("event"), Some(&Value::from("end")));
        assert!(parsed[3].get("durationMs").is_some());
        assert_eq!(parsed[1].get("spanId"), parsed[3].get("spanId"));
        Ok(())
    }

    #[test]
    fn secret_tags_are_redacted() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::default());
        let mut base = TelemetryTags::new();
        base.insert("sessionToken".into(), "abc".into());
        let telemetry = JsonTelemetry::new(sink.clone()).with_base_tags(base);

        telemetry.record_timer_ms("catalog.page", 5, None);

        let parsed = parse_lines(&sink)?;
        let tags = parsed[0]
            .get("tags")
            .and_then(Value::as_object)
            .ok_or("missing tags")?;
        assert_eq!(tags.get("sessionToken"), Some(&Value::from(REDACTED)));
        Ok(())
    }

    #[test]
    fn tagged_telemetry_merges_correlation_tag() {
        struct IdleTimer;

        impl TelemetryTimer for IdleTimer {
            fn stop(&self) {}
        }

        #[derive(Default)]
        struct CaptureTelemetry {
            tags: Mutex<Option<TelemetryTags>>,
        }

        impl TelemetryPort for CaptureTelemetry {
            fn increment_counter(&self, _name: &str, _value: u64, tags: Option<&TelemetryTags>) {
                if let Ok(mut guard) = self.tags.lock() {
                    *guard = tags.cloned();
                }
            }

            fn record_timer_ms(
                &self,
                _name: &str,
                _duration_ms: u64,
                _tags: Option<&TelemetryTags>,
            ) {
            }

            fn start_timer(
                &self,
                _name: &str,
                _tags: Option<&TelemetryTags>,
            ) -> Box<dyn TelemetryTimer> {
                Box::new(IdleTimer)
            }
        }

        let base = Arc::new(CaptureTelemetry::default());
        let mut tags = TelemetryTags::new();
        tags.insert("correlationId".into(), "req_456".into());
        let telemetry = TaggedTelemetry::new(base.clone(), tags);
        telemetry.increment_counter("counter", 1, None);

        let captured = base.tags.lock().ok().and_then(|guard| guard.clone());
        assert_eq!(
            captured
                .as_ref()
                .and_then(|tags| tags.get("correlationId"))
                .map(|value| value.as_ref()),
            Some("req_456")
        );
    }
}
