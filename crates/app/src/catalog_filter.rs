//! List the instance types a catalog offers, minus an exclude list.

use crate::CatalogFilterError;
use crate::exclude_matcher::{ExcludeMatcher, ExcludeMatcherOptions};
use instance_catalog_domain::{ExcludeList, InstanceTypeDescriptor};
use instance_catalog_ports::{
    CatalogPage, CatalogPort, InstanceTypeQuery, LogEvent, LogFields, LogLevel, LoggerPort,
    PageFlow, TelemetryPort, TelemetryTags,
};
use instance_catalog_shared::{ErrorEnvelope, RequestContext};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Counts gathered while listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListIncludedStats {
    /// Pages received from the catalog.
    pub pages: u64,
    /// Descriptors received across all pages.
    pub fetched: u64,
    /// Descriptors dropped by the exclude matcher.
    pub excluded: u64,
    /// Descriptors kept.
    pub included: u64,
}

/// Result of a listing, with its counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListIncludedOutput {
    /// Kept descriptors, in catalog order.
    pub instance_types: Vec<InstanceTypeDescriptor>,
    /// Counts gathered while listing.
    pub stats: ListIncludedStats,
}

/// Filters a compute catalog through a compiled exclude list.
///
/// The catalog is injected at construction; the filter owns no client state
/// of its own. Every listing issues a fresh enumeration.
#[derive(Clone)]
pub struct InstanceCatalogFilter {
    catalog: Arc<dyn CatalogPort>,
    matcher: ExcludeMatcher,
    logger: Option<Arc<dyn LoggerPort>>,
    telemetry: Option<Arc<dyn TelemetryPort>>,
}

impl InstanceCatalogFilter {
    /// Build a filter using exact matching and the default empty-list policy.
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        exclude_list: &ExcludeList,
    ) -> Result<Self, CatalogFilterError> {
        Self::with_options(catalog, exclude_list, ExcludeMatcherOptions::default())
    }

    /// Build a filter with explicit matcher options.
    pub fn with_options(
        catalog: Arc<dyn CatalogPort>,
        exclude_list: &ExcludeList,
        options: ExcludeMatcherOptions,
    ) -> Result<Self, CatalogFilterError> {
        let matcher = ExcludeMatcher::compile(exclude_list, options)?;
        Ok(Self::from_matcher(catalog, matcher))
    }

    /// Build a filter around an already compiled matcher.
    #[must_use]
    pub fn from_matcher(catalog: Arc<dyn CatalogPort>, matcher: ExcludeMatcher) -> Self {
        Self {
            catalog,
            matcher,
            logger: None,
            telemetry: None,
        }
    }

    /// Attach a structured logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Attach a telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetryPort>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Returns true when `name` is dropped from listings.
    ///
    /// With an empty exclude list this follows the configured
    /// [`EmptyExcludePolicy`](instance_catalog_domain::EmptyExcludePolicy);
    /// the default, `ExcludeAll`, answers true for every name.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.matcher.is_excluded(name)
    }

    /// List every `hvm` instance type the catalog offers that is not excluded.
    pub async fn list_included_instance_types(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<InstanceTypeDescriptor>, CatalogFilterError> {
        self.list_included_with_stats(ctx)
            .await
            .map(|output| output.instance_types)
    }

    /// Same as [`Self::list_included_instance_types`], also returning counts.
    #[tracing::instrument(
        name = "catalog.list_included",
        skip_all,
        fields(correlation_id = %ctx.correlation_id(), provider = %self.catalog.provider().id)
    )]
    pub async fn list_included_with_stats(
        &self,
        ctx: &RequestContext,
    ) -> Result<ListIncludedOutput, CatalogFilterError> {
        let started_at = Instant::now();
        let tags = provider_tags(&self.catalog.provider().id);
        let total_timer = self
            .telemetry
            .as_ref()
            .map(|telemetry| telemetry.start_timer("catalog.listIncluded.total", Some(&tags)));

        if let Some(logger) = self.logger.as_ref() {
            logger.info(
                "catalog.listIncluded.start",
                "Listing instance types",
                Some(self.log_fields_start()),
            );
        }

        let result = self.enumerate(ctx).await;

        if let Some(timer) = total_timer.as_ref() {
            timer.stop();
        }

        match result {
            Ok(output) => {
                self.record_success(&output.stats, &tags, started_at);
                Ok(output)
            },
            Err(error) => {
                self.record_failure(&error, &tags, started_at);
                Err(error)
            },
        }
    }

    async fn enumerate(
        &self,
        ctx: &RequestContext,
    ) -> Result<ListIncludedOutput, CatalogFilterError> {
        ctx.ensure_not_cancelled("catalog.list_included.start")
            .map_err(CatalogFilterError::fetch)?;

        let matcher = &self.matcher;
        let page_ctx = ctx.clone();
        let mut stats = ListIncludedStats::default();
        let mut included = Vec::new();
        let mut cancelled = false;

        let mut on_page = |page: CatalogPage| {
            if page_ctx.is_cancelled() {
                cancelled = true;
                return PageFlow::Stop;
            }
            stats.pages += 1;
            for descriptor in page.instance_types {
                stats.fetched += 1;
                if matcher.is_excluded(descriptor.name()) {
                    stats.excluded += 1;
                    continue;
                }
                included.push(descriptor);
            }
            PageFlow::Continue
        };

        self.catalog
            .enumerate_instance_types(ctx, InstanceTypeQuery::hvm(), &mut on_page)
            .await
            .map_err(CatalogFilterError::fetch)?;

        if cancelled {
            return Err(CatalogFilterError::fetch(
                ErrorEnvelope::cancelled("operation cancelled")
                    .with_metadata("operation", "catalog.list_included.page"),
            ));
        }

        stats.included = u64::try_from(included.len()).unwrap_or(u64::MAX);
        Ok(ListIncludedOutput {
            instance_types: included,
            stats,
        })
    }

    fn record_success(&self, stats: &ListIncludedStats, tags: &TelemetryTags, started_at: Instant) {
        if let Some(telemetry) = self.telemetry.as_ref() {
            telemetry.increment_counter("catalog.listIncluded.pages", stats.pages, Some(tags));
            telemetry.increment_counter("catalog.listIncluded.fetched", stats.fetched, Some(tags));
            telemetry.increment_counter("catalog.listIncluded.excluded", stats.excluded, Some(tags));
            telemetry.increment_counter("catalog.listIncluded.included", stats.included, Some(tags));
        }
        if let Some(logger) = self.logger.as_ref() {
            logger.info(
                "catalog.listIncluded.completed",
                "Listing completed",
                Some(log_fields_completed(stats, started_at)),
            );
        }
    }

    fn record_failure(&self, error: &CatalogFilterError, tags: &TelemetryTags, started_at: Instant) {
        let duration_ms = duration_ms(started_at);
        if error.is_cancelled() {
            if let Some(telemetry) = self.telemetry.as_ref() {
                telemetry.increment_counter("catalog.listIncluded.aborted", 1, Some(tags));
            }
            if let Some(logger) = self.logger.as_ref() {
                logger.info(
                    "catalog.listIncluded.aborted",
                    "Listing aborted",
                    Some(log_fields_duration(duration_ms)),
                );
            }
            return;
        }

        if let Some(telemetry) = self.telemetry.as_ref() {
            telemetry.increment_counter("catalog.listIncluded.failed", 1, Some(tags));
        }
        if let Some(logger) = self.logger.as_ref() {
            let payload = serde_json::to_value(ErrorEnvelope::from(error.clone()))
                .unwrap_or(Value::Null);
            logger.log(
                LogEvent::new(
                    LogLevel::Error,
                    "catalog.listIncluded.failed",
                    "Listing failed",
                    Some(log_fields_duration(duration_ms)),
                )
                .with_error(payload),
            );
        }
    }

    fn log_fields_start(&self) -> LogFields {
        let mut fields = LogFields::new();
        fields.insert(
            "providerId".into(),
            Value::String(self.catalog.provider().id.to_string()),
        );
        fields.insert(
            "matchMode".into(),
            self.matcher
                .mode()
                .map_or(Value::Null, |mode| Value::String(mode.as_str().to_owned())),
        );
        fields.insert(
            "emptyExcludePolicy".into(),
            Value::String(self.matcher.empty_policy().as_str().to_owned()),
        );
        fields
    }
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn provider_tags(provider_id: &str) -> TelemetryTags {
    let mut tags = TelemetryTags::new();
    tags.insert("providerId".into(), provider_id.into());
    tags
}

fn log_fields_duration(duration_ms: u64) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("durationMs".into(), Value::from(duration_ms));
    fields
}

fn log_fields_completed(stats: &ListIncludedStats, started_at: Instant) -> LogFields {
    let mut fields = log_fields_duration(duration_ms(started_at));
    fields.insert("pages".into(), Value::from(stats.pages));
    fields.insert("fetched".into(), Value::from(stats.fetched));
    fields.insert("excluded".into(), Value::from(stats.excluded));
    fields.insert("included".into(), Value::from(stats.included));
    fields
}
