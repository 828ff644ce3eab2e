use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "polemap_posts_fallback_total",
            Unit::Count,
            "Page loads that fell back to the sample posts after a failed fetch."
        );
        describe_counter!(
            "polemap_posts_dropped_total",
            Unit::Count,
            "Fetched post records dropped as malformed or duplicate."
        );
        describe_counter!(
            "polemap_page_renders_total",
            Unit::Count,
            "Map pages rendered by the HTTP surface."
        );
        describe_counter!(
            "polemap_page_sessions_evicted_total",
            Unit::Count,
            "Live map pages dropped to make room for newer ones."
        );
        describe_histogram!(
            "polemap_posts_response_seconds",
            Unit::Seconds,
            "Handler latency for responses that serve posts, by route."
        );
    });
}
