//! EC2 `DescribeInstanceTypes` catalog adapter.

use aws_sdk_ec2::Client as Ec2Client;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::{Filter, InstanceTypeInfo};
use instance_catalog_domain::{InstanceTypeDescriptor, InstanceTypeName};
use instance_catalog_ports::{
    BoxFuture, CatalogPage, CatalogPort, CatalogProviderInfo, InstanceTypeQuery, PageFlow,
    PageHandler,
};
use instance_catalog_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};

const VIRTUALIZATION_FILTER: &str = "supported-virtualization-type";

/// Error codes that mean "slow down" rather than "broken".
const THROTTLING_CODES: &[&str] = &[
    "RequestLimitExceeded",
    "Throttling",
    "ThrottlingException",
    "RequestThrottled",
];

/// Server-side outages; worth retrying but not a rate limit.
const UNAVAILABLE_CODES: &[&str] = &["InternalError", "ServiceUnavailable", "Unavailable"];

/// Catalog backed by the EC2 API.
#[derive(Debug, Clone)]
pub struct Ec2Catalog {
    provider: CatalogProviderInfo,
    client: Ec2Client,
}

impl Ec2Catalog {
    /// Wrap an already configured client.
    #[must_use]
    pub fn new(client: Ec2Client) -> Self {
        Self {
            provider: CatalogProviderInfo {
                id: "ec2".into(),
                name: "Amazon EC2".into(),
            },
            client,
        }
    }

    /// Build a client from the ambient AWS configuration (env, profile, IMDS).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Ec2Client::new(&config))
    }
}

impl CatalogPort for Ec2Catalog {
    fn provider(&self) -> &CatalogProviderInfo {
        &self.provider
    }

    fn enumerate_instance_types<'a>(
        &'a self,
        ctx: &RequestContext,
        query: InstanceTypeQuery,
        on_page: &'a mut PageHandler<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("ec2.describe_instance_types")?;

            let filter = Filter::builder()
                .name(VIRTUALIZATION_FILTER)
                .values(query.virtualization_type.as_str())
                .build();
            let mut pages = self
                .client
                .describe_instance_types()
                .filters(filter)
                .into_paginator()
                .send();

            let mut page_index = 0_u64;
            loop {
                let next = tokio::select! {
                    () = ctx.cancelled() => {
                        return Err(ErrorEnvelope::cancelled("operation cancelled")
                            .with_metadata("operation", "ec2.describe_instance_types"));
                    }
                    next = pages.next() => next,
                };
                let Some(output) = next else {
                    return Ok(());
                };
                let output = output.map_err(|error| map_sdk_error(&error, page_index))?;
                page_index += 1;

                let instance_types = output
                    .instance_types()
                    .iter()
                    .map(to_descriptor)
                    .collect::<Result<Vec<_>>>()?;
                tracing::debug!(
                    page = page_index,
                    count = instance_types.len(),
                    "received instance type page"
                );

                let page = CatalogPage {
                    instance_types,
                    is_last: output.next_token().is_none_or(str::is_empty),
                };
                if on_page(page) == PageFlow::Stop {
                    return Ok(());
                }
            }
        })
    }
}

fn to_descriptor(info: &InstanceTypeInfo) -> Result<InstanceTypeDescriptor> {
    let raw_name = info.instance_type().map(|kind| kind.as_str()).ok_or_else(|| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("ec2", "invalid_response"),
            "instance type entry without a name",
            ErrorClass::NonRetriable,
        )
    })?;
    let name = InstanceTypeName::parse(raw_name).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("ec2", "invalid_response"),
            format!("invalid instance type name from EC2: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;

    let mut descriptor = InstanceTypeDescriptor::named(name);
    descriptor.default_vcpus = info
        .v_cpu_info()
        .and_then(|vcpu| vcpu.default_v_cpus())
        .and_then(|count| u32::try_from(count).ok());
    descriptor.memory_mib = info
        .memory_info()
        .and_then(|memory| memory.size_in_mib())
        .and_then(|size| u64::try_from(size).ok());
    descriptor.current_generation = info.current_generation();
    Ok(descriptor)
}

fn map_sdk_error<E, R>(error: &SdkError<E, R>, page_index: u64) -> ErrorEnvelope
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(error).to_string();
    let (code, class) = match error {
        SdkError::TimeoutError(_) => ("timeout", ErrorClass::Retriable),
        SdkError::DispatchFailure(_) => ("dispatch_failure", ErrorClass::Retriable),
        SdkError::ResponseError(_) => ("invalid_response", ErrorClass::Retriable),
        SdkError::ServiceError(_) => classify_service_code(error.code()),
        _ => ("request_failed", ErrorClass::NonRetriable),
    };

    let mut envelope = ErrorEnvelope::unexpected(ErrorCode::new("ec2", code), message, class)
        .with_metadata("operation", "DescribeInstanceTypes")
        .with_metadata("page", page_index.to_string());
    if let Some(service_code) = error.code() {
        envelope = envelope.with_metadata("serviceCode", service_code);
    }
    envelope
}

fn classify_service_code(code: Option<&str>) -> (&'static str, ErrorClass) {
    match code {
        Some(code) if THROTTLING_CODES.contains(&code) => ("throttled", ErrorClass::Retriable),
        Some(code) if UNAVAILABLE_CODES.contains(&code) => ("unavailable", ErrorClass::Retriable),
        Some("UnauthorizedOperation" | "AuthFailure") => ("unauthorized", ErrorClass::NonRetriable),
        _ => ("service_error", ErrorClass::NonRetriable),
    }
}
