//! Log export bootstrap.
//!
//! Builds an [`SdkLoggerProvider`] that batches log records to the collector over
//! OTLP/gRPC, or a provider without processors when export is disabled. Ordinary
//! `tracing` events reach the provider through [`LoggingHandle::bridge_layer`].

use opentelemetry::logs::LoggerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::{LogExporter, SdkLogger, SdkLoggerProvider};
use tracing::info;

use crate::telemetry::config::TelemetryConfig;
use crate::telemetry::error::{shutdown_result, Signal, TelemetryError};
use crate::telemetry::exporter::build_log_exporter;
use crate::telemetry::resource::{build_resource, instrumentation_scope};

/// Bridge layer mirroring `tracing` events into OpenTelemetry log records
pub type LogBridgeLayer = OpenTelemetryTracingBridge<SdkLoggerProvider, SdkLogger>;

/// Caller-owned handle to the log pipeline
#[derive(Debug, Clone)]
pub struct LoggingHandle {
    service_name: String,
    service_version: String,
    provider: SdkLoggerProvider,
    exporting: bool,
}

impl LoggingHandle {
    /// Build the log pipeline described by `config`.
    ///
    /// Without a collector endpoint (or with export disabled) this never fails and the
    /// returned handle discards every record. Otherwise the endpoint is validated and a
    /// batching OTLP/gRPC exporter is attached; on error nothing is built.
    pub fn init(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        if !config.is_export_enabled() {
            return Ok(Self::disabled(config));
        }

        let exporter = build_log_exporter(config)?;
        info!(
            endpoint = config.collector_endpoint.as_deref().unwrap_or_default(),
            service = %config.service_name,
            "Initialize log export"
        );

        Ok(Self::with_exporter(config, exporter))
    }

    /// Handle that emits nothing
    pub fn disabled(config: &TelemetryConfig) -> Self {
        let provider = SdkLoggerProvider::builder()
            .with_resource(build_resource(config))
            .build();

        Self::from_provider(config, provider, false)
    }

    /// Build an exporting handle around any log exporter
    pub fn with_exporter<E>(config: &TelemetryConfig, exporter: E) -> Self
    where
        E: LogExporter + 'static,
    {
        let provider = SdkLoggerProvider::builder()
            .with_resource(build_resource(config))
            .with_batch_exporter(exporter)
            .build();

        Self::from_provider(config, provider, true)
    }

    fn from_provider(
        config: &TelemetryConfig,
        provider: SdkLoggerProvider,
        exporting: bool,
    ) -> Self {
        Self {
            service_name: config.service_name.clone(),
            service_version: config.service_version.clone(),
            provider,
            exporting,
        }
    }

    /// Logger scoped to the service name recorded at init
    pub fn logger(&self) -> SdkLogger {
        self.provider
            .logger_with_scope(instrumentation_scope(&self.service_name, &self.service_version))
    }

    pub fn bridge_layer(&self) -> LogBridgeLayer {
        OpenTelemetryTracingBridge::new(&self.provider)
    }

    pub fn provider(&self) -> &SdkLoggerProvider {
        &self.provider
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Flush buffered records and close the exporter.
    ///
    /// Blocks until the batch processor drains or its export timeout elapses.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        if !self.exporting {
            return Ok(());
        }
        shutdown_result(Signal::Logs, self.provider.shutdown())
    }
}

impl Default for LoggingHandle {
    fn default() -> Self {
        Self::disabled(&TelemetryConfig::builder().build())
    }
}
