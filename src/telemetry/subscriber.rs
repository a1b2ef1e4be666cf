use tracing::Subscriber;
use tracing_subscriber::filter::Filtered;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::telemetry::config::{LogFormat, TelemetryConfig};
use crate::telemetry::error::TelemetryError;
use crate::telemetry::logging::{LogBridgeLayer, LoggingHandle};
use crate::telemetry::trace::TracingHandle;

/// Crates whose events must not be bridged: exporting them would feed the exporter's
/// own transport activity back into the log pipeline.
const BRIDGE_SILENCED: &[&str] = &[
    "hyper",
    "h2",
    "tonic",
    "tower",
    "opentelemetry",
    "opentelemetry_sdk",
    "opentelemetry_otlp",
];

/// Build the JSON fmt layer for structured logging (cloud environments)
pub fn build_json_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_ansi(false)
}

/// Build the pretty fmt layer for human-readable output (local dev)
pub fn build_pretty_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
}

/// Parse `log_level` (seeded from `RUST_LOG` by [`TelemetryConfig::from_env`]) and turn
/// off every `silenced` target. A malformed level is rejected, never ignored.
fn parse_directives<'a>(
    config: &TelemetryConfig,
    silenced: impl IntoIterator<Item = &'a str>,
) -> Result<EnvFilter, TelemetryError> {
    let mut directives = vec![config.log_level.clone()];
    directives.extend(silenced.into_iter().map(|target| format!("{target}=off")));

    EnvFilter::try_new(directives.join(",")).map_err(|e| {
        TelemetryError::Config(format!("invalid log level `{}`: {e}", config.log_level))
    })
}

/// Build the env filter from config
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    parse_directives(config, [])
}

/// Filter for the log bridge: the configured level minus the exporter's transport crates
pub fn build_bridge_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    parse_directives(config, BRIDGE_SILENCED.iter().copied())
}

/// Log bridge restricted by [`build_bridge_filter`]
pub fn build_bridge_layer<S>(
    logging: &LoggingHandle,
    config: &TelemetryConfig,
) -> Result<Filtered<LogBridgeLayer, EnvFilter, S>, TelemetryError>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    Ok(logging.bridge_layer().with_filter(build_bridge_filter(config)?))
}

/// Compose the subscriber carrying the span layer, the log bridge and local fmt output.
///
/// Nothing is installed; every filter is validated here so that installation can only
/// fail on an already present global subscriber.
pub fn build_subscriber(
    config: &TelemetryConfig,
    logs: &LoggingHandle,
    traces: &TracingHandle,
) -> Result<impl Subscriber + Send + Sync + 'static, TelemetryError> {
    let filter = build_filter(config)?;
    let otel_layer = traces.layer();
    let bridge_layer = build_bridge_layer(logs, config)?;

    let pretty = (config.log_format == LogFormat::Pretty).then(build_pretty_layer);
    let json = (config.log_format == LogFormat::Json).then(build_json_layer);

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(bridge_layer)
        .with(pretty)
        .with(json))
}

/// Install [`build_subscriber`] as the global default.
///
/// Fails if a global subscriber is already set; the OpenTelemetry providers stay usable
/// through their handles in that case.
pub fn init_subscriber(
    config: &TelemetryConfig,
    logs: &LoggingHandle,
    traces: &TracingHandle,
) -> Result<(), TelemetryError> {
    build_subscriber(config, logs, traces)?
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))
}
