//! Runtime composition for the `instance-catalog` command.

use crate::catalog_factory::build_catalog_port;
use crate::observability::{ProfileRecorder, build_stderr_logger};
use crate::{InfraError, InfraResult};
use instance_catalog_app::{
    ExcludeMatcher, ExcludeMatcherOptions, InstanceCatalogFilter, ListIncludedStats,
};
use instance_catalog_config::ValidatedAppConfig;
use instance_catalog_ports::{LoggerPort, TelemetryPort, TelemetryTimer};
use instance_catalog_shared::RequestContext;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Per-invocation options that do not belong in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Write the run's telemetry as JSON lines to this file.
    pub profile_path: Option<PathBuf>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Number of instance types left after exclusion.
    pub count: usize,
    /// Counts gathered while listing.
    pub stats: ListIncludedStats,
}

/// List the included instance types with a fresh request context.
///
/// Blocks on a current-thread runtime. Ctrl-C cancels the request.
pub fn run_list_included(
    config: &ValidatedAppConfig,
    options: &RunOptions,
) -> InfraResult<RunReport> {
    run_list_included_with_ctx(config, options, RequestContext::new_request())
}

/// Same as [`run_list_included`] with a caller-provided context.
pub fn run_list_included_with_ctx(
    config: &ValidatedAppConfig,
    options: &RunOptions,
    ctx: RequestContext,
) -> InfraResult<RunReport> {
    let logger = build_stderr_logger(config.observability.log_level, &ctx);
    let profile = options
        .profile_path
        .as_deref()
        .map(|path| ProfileRecorder::create(path, &ctx))
        .transpose()?;

    let run_timer = profile
        .as_ref()
        .map(|profile| profile.telemetry().start_timer("run.total", None));

    let (logger, recorder) = (&logger, profile.as_ref());
    let result = run_async_with_ctx(ctx, |ctx| async move {
        let interrupt = spawn_interrupt_watcher(&ctx);
        let result = list_included(config, &ctx, logger, recorder).await;
        interrupt.abort();
        result
    });

    if let Some(timer) = run_timer {
        timer.stop();
    }
    if let Some(profile) = profile.as_ref() {
        profile.finish()?;
        tracing::debug!(path = %profile.path().display(), "profile written");
    }
    result
}

async fn list_included(
    config: &ValidatedAppConfig,
    ctx: &RequestContext,
    logger: &Arc<dyn LoggerPort>,
    profile: Option<&ProfileRecorder>,
) -> InfraResult<RunReport> {
    let options = ExcludeMatcherOptions {
        mode: config.catalog.match_mode,
        empty_policy: config.catalog.empty_exclude_policy,
    };
    // Entries are compiled before any client or fixture is touched.
    let matcher = ExcludeMatcher::compile(&config.exclude_list(), options)?;
    let catalog = build_catalog_port(&config.catalog).await?;
    let mut filter =
        InstanceCatalogFilter::from_matcher(catalog, matcher).with_logger(Arc::clone(logger));
    if let Some(profile) = profile {
        filter = filter.with_telemetry(profile.telemetry());
    }

    let output = filter.list_included_with_stats(ctx).await?;
    Ok(RunReport {
        count: output.instance_types.len(),
        stats: output.stats,
    })
}

fn run_async_with_ctx<F, T>(
    ctx: RequestContext,
    op: impl FnOnce(RequestContext) -> F,
) -> InfraResult<T>
where
    F: Future<Output = Result<T, InfraError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(InfraError::from)?;
    runtime.block_on(async { op(ctx).await })
}

fn spawn_interrupt_watcher(ctx: &RequestContext) -> tokio::task::JoinHandle<()> {
    let token = ctx.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling request");
            token.cancel();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use instance_catalog_config::{AppConfig, CatalogProviderKind};
    use instance_catalog_domain::ExcludeMatchMode;
    use instance_catalog_shared::ErrorCode;
    use std::error::Error;

    fn fixture_config(
        contents: &str,
        tag: &str,
    ) -> Result<(ValidatedAppConfig, PathBuf), Box<dyn Error>> {
        let path = std::env::temp_dir().join(format!(
            "instance-catalog-run-{tag}-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, contents)?;
        let mut config = AppConfig::default();
        config.catalog.provider = CatalogProviderKind::Fixture;
        config.catalog.fixture_path = Some(path.clone());
        config.catalog.exclude_list = vec!["a1.metal".into(), "a1.medium".into()];
        Ok((config.validate_and_normalize()?, path))
    }

    #[test]
    fn counts_included_types() -> Result<(), Box<dyn Error>> {
        let (config, path) = fixture_config(
            r#"{"pages": [["a1.metal", "a1.medium"], ["a1.large", "t3.micro"]]}"#,
            "ok",
        )?;
        let report = run_list_included(&config, &RunOptions::default());
        std::fs::remove_file(&path)?;

        let report = report?;
        assert_eq!(report.count, 2);
        assert_eq!(report.stats.pages, 2);
        assert_eq!(report.stats.excluded, 2);
        Ok(())
    }

    #[test]
    fn fetch_failure_surfaces_catalog_code() -> Result<(), Box<dyn Error>> {
        let (config, path) = fixture_config(
            r#"{"pages": [["t3.micro"], ["m5.large"]], "failAfterPages": 1}"#,
            "fail",
        )?;
        let result = run_list_included(&config, &RunOptions::default());
        std::fs::remove_file(&path)?;

        let error = result.err().ok_or("expected fetch failure")?;
        assert_eq!(error.code, ErrorCode::new("catalog", "fetch_failed"));
        Ok(())
    }

    #[test]
    fn invalid_pattern_fails_before_the_catalog_is_built() -> Result<(), Box<dyn Error>> {
        let mut config = AppConfig::default();
        config.catalog.provider = CatalogProviderKind::Fixture;
        config.catalog.fixture_path = Some(std::env::temp_dir().join(format!(
            "instance-catalog-run-absent-{}.json",
            std::process::id()
        )));
        config.catalog.match_mode = ExcludeMatchMode::Pattern;
        config.catalog.exclude_list = vec!["a1.(large".into()];
        let config = config.validate_and_normalize()?;

        let error = run_list_included(&config, &RunOptions::default())
            .err()
            .ok_or("expected invalid exclude entry")?;
        assert_eq!(
            error.code,
            ErrorCode::new("catalog", "invalid_exclude_entry")
        );
        assert_eq!(
            error.metadata.get("entry").map(String::as_str),
            Some("a1.(large")
        );
        Ok(())
    }

    #[test]
    fn cancelled_context_stops_before_fetching() -> Result<(), Box<dyn Error>> {
        let (config, path) = fixture_config(r#"{"pages": [["t3.micro"]]}"#, "cancel")?;
        let ctx = RequestContext::new_request();
        ctx.cancel();
        let result = run_list_included_with_ctx(&config, &RunOptions::default(), ctx);
        std::fs::remove_file(&path)?;

        let error = result.err().ok_or("expected cancellation")?;
        assert!(error.is_cancelled());
        Ok(())
    }

    #[test]
    fn profile_path_receives_telemetry() -> Result<(), Box<dyn Error>> {
        let (config, path) = fixture_config(r#"{"pages": [["t3.micro"]]}"#, "profile")?;
        let profile_path = std::env::temp_dir().join(format!(
            "instance-catalog-run-profile-{}.jsonl",
            std::process::id()
        ));
        let options = RunOptions {
            profile_path: Some(profile_path.clone()),
        };
        let report = run_list_included(&config, &options);
        let contents = std::fs::read_to_string(&profile_path);
        std::fs::remove_file(&path)?;
        std::fs::remove_file(&profile_path)?;

        assert_eq!(report?.count, 1);
        let contents = contents?;
        assert!(contents.contains("catalog.listIncluded.total"));
        assert!(contents.contains("\"run.total\""));
        Ok(())
    }
}
