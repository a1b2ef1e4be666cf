//! Trace export bootstrap.
//!
//! Builds an [`SdkTracerProvider`] that samples every span and batches it to the
//! collector over OTLP/gRPC. With `install_globals` the provider becomes the global
//! tracer provider and the W3C trace-context propagator is installed alongside it.

use std::borrow::Cow;

use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::trace::noop::NoopTracerProvider;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::InstrumentationScope;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Sampler, SdkTracer, SdkTracerProvider, SpanExporter};
use opentelemetry_semantic_conventions::SCHEMA_URL;
use tracing::{info, Subscriber};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;

use crate::telemetry::config::TelemetryConfig;
use crate::telemetry::error::{shutdown_result, Signal, TelemetryError};
use crate::telemetry::exporter::build_span_exporter;
use crate::telemetry::resource::{build_resource, instrumentation_scope};

/// Tracer from whichever provider is globally installed right now.
///
/// Before any bootstrap ran this is the API's no-op provider. The returned tracer stays
/// bound to that provider; it does not follow a later swap.
pub fn global_tracer(name: impl Into<Cow<'static, str>>) -> BoxedTracer {
    let scope = InstrumentationScope::builder(name)
        .with_schema_url(SCHEMA_URL)
        .build();
    global::tracer_provider().tracer_with_scope(scope)
}

/// Caller-owned handle to the trace pipeline
#[derive(Debug, Clone)]
pub struct TracingHandle {
    service_name: String,
    service_version: String,
    provider: SdkTracerProvider,
    exporting: bool,
}

impl TracingHandle {
    /// Build the trace pipeline described by `config` and, with `install_globals`,
    /// install it process-wide through [`TracingHandle::install_global`].
    ///
    /// Disabled export never fails. The exporting path validates the endpoint first and
    /// installs nothing when exporter construction fails.
    pub fn init(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let handle = Self::build(config)?;
        if config.install_globals {
            handle.install_global();
        }

        Ok(handle)
    }

    /// Same as [`TracingHandle::init`] but never touches process-wide state
    pub fn build(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        if !config.is_export_enabled() {
            return Ok(Self::disabled(config));
        }

        let exporter = build_span_exporter(config)?;
        info!(
            endpoint = config.collector_endpoint.as_deref().unwrap_or_default(),
            service = %config.service_name,
            "Initialize tracing"
        );

        Ok(Self::with_exporter(config, exporter))
    }

    /// Handle whose spans are never sampled nor exported
    pub fn disabled(config: &TelemetryConfig) -> Self {
        let provider = SdkTracerProvider::builder()
            .with_sampler(Sampler::AlwaysOff)
            .with_resource(build_resource(config))
            .build();

        Self::from_provider(config, provider, false)
    }

    /// Build an exporting handle around any span exporter. Every span is sampled.
    pub fn with_exporter<E>(config: &TelemetryConfig, exporter: E) -> Self
    where
        E: SpanExporter + 'static,
    {
        let provider = SdkTracerProvider::builder()
            .with_sampler(Sampler::AlwaysOn)
            .with_resource(build_resource(config))
            .with_batch_exporter(exporter)
            .build();

        Self::from_provider(config, provider, true)
    }

    fn from_provider(
        config: &TelemetryConfig,
        provider: SdkTracerProvider,
        exporting: bool,
    ) -> Self {
        Self {
            service_name: config.service_name.clone(),
            service_version: config.service_version.clone(),
            provider,
            exporting,
        }
    }

    /// Make this provider the global tracer provider and install the trace-context propagator.
    ///
    /// A handle that does not export installs the API's no-op provider instead.
    pub fn install_global(&self) {
        if !self.exporting {
            global::set_tracer_provider(NoopTracerProvider::new());
            return;
        }
        global::set_tracer_provider(self.provider.clone());
        global::set_text_map_propagator(TraceContextPropagator::new());
    }

    /// Tracer scoped to the service name recorded at init
    pub fn tracer(&self) -> SdkTracer {
        self.provider
            .tracer_with_scope(instrumentation_scope(&self.service_name, &self.service_version))
    }

    /// Build the OpenTelemetry tracing layer
    pub fn layer<S>(&self) -> OpenTelemetryLayer<S, SdkTracer>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        tracing_opentelemetry::layer().with_tracer(self.tracer())
    }

    pub fn provider(&self) -> &SdkTracerProvider {
        &self.provider
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Flush buffered spans and close the exporter
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        if !self.exporting {
            return Ok(());
        }
        shutdown_result(Signal::Traces, self.provider.shutdown())
    }
}

impl Default for TracingHandle {
    fn default() -> Self {
        Self::disabled(&TelemetryConfig::builder().build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::propagation::TextMapPropagator;
    use opentelemetry::trace::{Span, Tracer};
    use opentelemetry_sdk::trace::InMemorySpanExporter;
    use std::time::Duration;
    use tracing_subscriber::layer::SubscriberExt;

    fn test_config() -> TelemetryConfig {
        TelemetryConfig::new("test-service", "1.0.0").with_install_globals(false)
    }

    #[test]
    fn init_without_endpoint_is_disabled() {
        let handle = TracingHandle::init(&test_config()).unwrap();

        assert!(!handle.is_exporting());
        assert_eq!(handle.service_name(), "test-service");
    }

    #[test]
    fn disabled_handle_never_records() {
        let handle = TracingHandle::init(&test_config()).unwrap();

        let span = handle.tracer().start("checkout");

        assert!(!span.is_recording());
        assert!(handle.shutdown().is_ok());
    }

    #[test]
    fn default_handle_is_a_noop_tracer() {
        let handle = TracingHandle::default();

        let mut span = handle.tracer().start("before-init");
        assert!(!span.is_recording());
        span.end();
        assert!(handle.shutdown().is_ok());
    }

    #[test]
    fn global_tracer_never_fails() {
        let mut span = global_tracer("checkout").start("anything");
        span.set_attribute(opentelemetry::KeyValue::new("k", "v"));
        span.end();
    }

    #[test]
    fn exporting_handle_samples_every_span() {
        let exporter = InMemorySpanExporter::default();
        let handle = TracingHandle::with_exporter(&test_config(), exporter.clone());
        let tracer = handle.tracer();

        for name in ["checkout", "payment", "shipping"] {
            let mut span = tracer.start(name);
            assert!(span.span_context().is_sampled());
            span.end();
        }
        handle.provider().force_flush().unwrap();

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].instrumentation_scope.name(), "test-service");
    }

    #[test]
    fn layer_exports_tracing_spans() {
        let exporter = InMemorySpanExporter::default();
        let handle = TracingHandle::with_exporter(&test_config(), exporter.clone());
        let subscriber = tracing_subscriber::registry().with(handle.layer());

        tracing::subscriber::with_default(subscriber, || {
            let _span = tracing::info_span!("handle_request").entered();
        });
        handle.provider().force_flush().unwrap();

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "handle_request");
    }

    #[test]
    fn repeated_shutdown_is_ok() {
        let handle = TracingHandle::with_exporter(&test_config(), InMemorySpanExporter::default());

        assert!(handle.shutdown().is_ok());
        assert!(handle.shutdown().is_ok());
    }

    #[test]
    fn malformed_endpoint_fails_init() {
        let config = test_config().with_collector_endpoint("exa mple:4317");

        let result = TracingHandle::init(&config);

        assert!(matches!(result, Err(TelemetryError::Config(_))));
    }

    // The only unit test touching process-wide providers
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn init_replaces_global_provider_and_installs_propagator() {
        let disabled = TelemetryConfig::new("test-service", "1.0.0");
        let handle = TracingHandle::init(&disabled).unwrap();
        assert!(!global_tracer("checkout").start("noop").is_recording());
        assert!(handle.shutdown().is_ok());

        let enabled = disabled
            .with_collector_endpoint("localhost:4317")
            .with_export_timeout(Duration::from_millis(500));
        let handle = TracingHandle::init(&enabled).unwrap();

        assert!(handle.is_exporting());
        assert!(global_tracer("checkout").start("live").is_recording());

        let fields: Vec<String> = global::get_text_map_propagator(|propagator| {
            propagator.fields().map(str::to_string).collect()
        });
        assert!(fields.iter().any(|field| field == "traceparent"));

        // Nothing listens on the collector port; shutdown must still return
        let _ = handle.shutdown();
    }
}
