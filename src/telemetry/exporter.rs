use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use tonic::codegen::http::Uri;

use crate::telemetry::config::TelemetryConfig;
use crate::telemetry::error::{Signal, TelemetryError};

const PLAINTEXT_SCHEME: &str = "http";

/// Normalize a collector address into a plaintext gRPC URI.
///
/// `host:port` gets an `http://` scheme. Any scheme other than `http` is rejected,
/// the exporters never negotiate TLS.
pub fn collector_uri(endpoint: &str) -> Result<String, TelemetryError> {
    let endpoint = endpoint.trim();

    let candidate = match endpoint.split_once("://") {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(PLAINTEXT_SCHEME) => {
            format!("{PLAINTEXT_SCHEME}://{rest}")
        }
        Some((scheme, _)) => {
            return Err(TelemetryError::Config(format!(
                "unsupported scheme `{scheme}` in collector endpoint `{endpoint}` (insecure gRPC only)"
            )))
        }
        None => format!("{PLAINTEXT_SCHEME}://{endpoint}"),
    };

    let uri: Uri = candidate.parse().map_err(|e| {
        TelemetryError::Config(format!("invalid collector endpoint `{endpoint}`: {e}"))
    })?;

    if uri.host().map_or(true, str::is_empty) {
        return Err(TelemetryError::Config(format!(
            "collector endpoint `{endpoint}` has no host"
        )));
    }

    Ok(candidate)
}

fn export_endpoint(config: &TelemetryConfig) -> Result<String, TelemetryError> {
    let endpoint = config
        .collector_endpoint
        .as_deref()
        .ok_or_else(|| TelemetryError::Config("no collector endpoint configured".to_string()))?;
    collector_uri(endpoint)
}

/// The tonic channel is spawned onto the ambient runtime; fail instead of panicking without one.
fn ensure_runtime(signal: Signal) -> Result<(), TelemetryError> {
    tokio::runtime::Handle::try_current()
        .map(|_| ())
        .map_err(|e| {
            TelemetryError::Init(format!(
                "{signal} exporter requires a running Tokio runtime: {e}"
            ))
        })
}

/// Build the OTLP/gRPC span exporter for the configured collector
pub fn build_span_exporter(config: &TelemetryConfig) -> Result<SpanExporter, TelemetryError> {
    let endpoint = export_endpoint(config)?;
    ensure_runtime(Signal::Traces)?;

    let mut builder = SpanExporter::builder().with_tonic().with_endpoint(endpoint);
    if let Some(timeout) = config.export_timeout {
        builder = builder.with_timeout(timeout);
    }

    builder
        .build()
        .map_err(TelemetryError::exporter(Signal::Traces))
}

/// Build the OTLP/gRPC log exporter for the configured collector
pub fn build_log_exporter(config: &TelemetryConfig) -> Result<LogExporter, TelemetryError> {
    let endpoint = export_endpoint(config)?;
    ensure_runtime(Signal::Logs)?;

    let mut builder = LogExporter::builder().with_tonic().with_endpoint(endpoint);
    if let Some(timeout) = config.export_timeout {
        builder = builder.with_timeout(timeout);
    }

    builder.build().map_err(TelemetryError::exporter(Signal::Logs))
}
