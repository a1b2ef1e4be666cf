use std::env;
use std::time::Duration;

use opentelemetry::KeyValue;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty human-readable format with colors (for local dev)
    #[default]
    Pretty,
    /// JSON structured format (for cloud environments)
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Main telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    /// Collector address (`host:port` or `http://host:port`). `None` disables export.
    pub collector_endpoint: Option<String>,
    /// Master switch; export only happens when this is set and an endpoint is present.
    pub enabled: bool,
    /// Extra resource attributes; these take precedence over the service defaults.
    pub resource_attributes: Vec<KeyValue>,
    pub export_timeout: Option<Duration>,
    /// Install the tracer provider and trace-context propagator as process-wide state.
    pub install_globals: bool,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl TelemetryConfig {
    /// Create config from environment variables
    /// - OTEL_SERVICE_NAME / OTEL_SERVICE_VERSION for the service identity
    /// - OTEL_EXPORTER_OTLP_ENDPOINT for the collector (export disabled when unset)
    /// - OTEL_SDK_DISABLED=true to force no-op providers
    /// - OTEL_RESOURCE_ATTRIBUTES as `key=value,key2=value2`
    /// - OTEL_EXPORTER_OTLP_TIMEOUT in milliseconds
    /// - RUST_LOG and LOG_FORMAT for local log output
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] but reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(
            lookup("OTEL_SERVICE_NAME").unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
            lookup("OTEL_SERVICE_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        );

        if let Some(endpoint) = lookup("OTEL_EXPORTER_OTLP_ENDPOINT") {
            config = config.with_collector_endpoint(endpoint);
        }

        config.enabled = !lookup("OTEL_SDK_DISABLED")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if let Some(raw) = lookup("OTEL_RESOURCE_ATTRIBUTES") {
            config.resource_attributes = parse_resource_attributes(&raw);
        }

        config.export_timeout = lookup("OTEL_EXPORTER_OTLP_TIMEOUT")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis);

        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT").as_deref().and_then(LogFormat::parse) {
            config.log_format = format;
        }

        config
    }

    /// Create a new config with explicit values
    pub fn new(service_name: impl Into<String>, service_version: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            collector_endpoint: None,
            enabled: true,
            resource_attributes: Vec::new(),
            export_timeout: None,
            install_globals: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }

    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }

    /// Whether a live exporter should be built
    pub fn is_export_enabled(&self) -> bool {
        self.enabled && self.collector_endpoint.is_some()
    }

    /// Set the collector endpoint; an empty value disables export.
    pub fn with_collector_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.collector_endpoint = non_empty(endpoint.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_resource_attribute(mut self, attribute: KeyValue) -> Self {
        self.resource_attributes.push(attribute);
        self
    }

    pub fn with_resource_attributes(
        mut self,
        attributes: impl IntoIterator<Item = KeyValue>,
    ) -> Self {
        self.resource_attributes.extend(attributes);
        self
    }

    pub fn with_export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = Some(timeout);
        self
    }

    pub fn with_install_globals(mut self, install: bool) -> Self {
        self.install_globals = install;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse `key=value,key2=value2`; entries without `=` or with an empty key are skipped.
fn parse_resource_attributes(raw: &str) -> Vec<KeyValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.split_once('='))
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| KeyValue::new(key.trim().to_string(), value.trim().to_string()))
        .collect()
}

#[derive(Default)]
pub struct TelemetryConfigBuilder {
    service_name: Option<String>,
    service_version: Option<String>,
    collector_endpoint: Option<String>,
    enabled: Option<bool>,
    resource_attributes: Vec<KeyValue>,
    export_timeout: Option<Duration>,
    install_globals: Option<bool>,
    log_level: Option<String>,
    log_format: Option<LogFormat>,
}

impl TelemetryConfigBuilder {
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn collector_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.collector_endpoint = non_empty(endpoint.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn resource_attribute(mut self, attribute: KeyValue) -> Self {
        self.resource_attributes.push(attribute);
        self
    }

    pub fn export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = Some(timeout);
        self
    }

    pub fn install_globals(mut self, install: bool) -> Self {
        self.install_globals = Some(install);
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    pub fn json(self) -> Self {
        self.log_format(LogFormat::Json)
    }

    pub fn pretty(self) -> Self {
        self.log_format(LogFormat::Pretty)
    }

    pub fn build(self) -> TelemetryConfig {
        TelemetryConfig {
            service_name: self
                .service_name
                .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
            service_version: self
                .service_version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            collector_endpoint: self.collector_endpoint,
            enabled: self.enabled.unwrap_or(true),
            resource_attributes: self.resource_attributes,
            export_timeout: self.export_timeout,
            install_globals: self.install_globals.unwrap_or(true),
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
            log_format: self.log_format.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn log_format_default_is_pretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn config_new_sets_defaults() {
        let config = TelemetryConfig::new("test-service", "1.0.0");

        assert_eq!(config.service_name, "test-service");
        assert_eq!(config.service_version, "1.0.0");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.collector_endpoint.is_none());
        assert!(config.resource_attributes.is_empty());
        assert!(config.enabled);
        assert!(config.install_globals);
        assert!(!config.is_export_enabled());
    }

    #[test]
    fn empty_endpoint_disables_export() {
        let config = TelemetryConfig::new("svc", "1.0.0").with_collector_endpoint("");
        assert!(config.collector_endpoint.is_none());
        assert!(!config.is_export_enabled());

        let config = TelemetryConfig::new("svc", "1.0.0").with_collector_endpoint("   ");
        assert!(!config.is_export_enabled());
    }

    #[test]
    fn enabled_flag_overrides_endpoint() {
        let config = TelemetryConfig::new("svc", "1.0.0")
            .with_collector_endpoint("localhost:4317")
            .with_enabled(false);

        assert!(!config.is_export_enabled());
    }

    #[test]
    fn config_with_methods_chain() {
        let config = TelemetryConfig::new("svc", "1.0")
            .with_log_level("debug")
            .with_log_format(LogFormat::Json)
            .with_collector_endpoint(" localhost:4317 ")
            .with_export_timeout(Duration::from_secs(3))
            .with_install_globals(false)
            .with_resource_attribute(KeyValue::new("deployment.environment", "test"));

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.collector_endpoint.as_deref(), Some("localhost:4317"));
        assert_eq!(config.export_timeout, Some(Duration::from_secs(3)));
        assert!(!config.install_globals);
        assert_eq!(config.resource_attributes.len(), 1);
        assert!(config.is_export_enabled());
    }

    #[test]
    fn builder_sets_all_fields() {
        let config = TelemetryConfigBuilder::default()
            .service_name("my-service")
            .service_version("2.0.0")
            .log_level("warn")
            .collector_endpoint("collector:4317")
            .resource_attribute(KeyValue::new("team", "platform"))
            .install_globals(false)
            .json()
            .build();

        assert_eq!(config.service_name, "my-service");
        assert_eq!(config.service_version, "2.0.0");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.collector_endpoint.as_deref(), Some("collector:4317"));
        assert_eq!(config.resource_attributes.len(), 1);
        assert!(!config.install_globals);
    }

    #[test]
    fn builder_uses_defaults_when_not_set() {
        let config = TelemetryConfig::builder().build();

        assert_eq!(config.service_name, env!("CARGO_PKG_NAME"));
        assert_eq!(config.service_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.enabled);
        assert!(!config.is_export_enabled());
    }

    #[test]
    fn builder_pretty_sets_log_format() {
        let config = TelemetryConfig::builder().json().pretty().build();
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn from_lookup_without_vars_uses_package_defaults() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.service_name, env!("CARGO_PKG_NAME"));
        assert_eq!(config.service_version, env!("CARGO_PKG_VERSION"));
        assert!(config.collector_endpoint.is_none());
        assert!(config.enabled);
        assert!(config.export_timeout.is_none());
    }

    #[test]
    fn from_lookup_reads_all_variables() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("OTEL_SERVICE_NAME", "orders"),
            ("OTEL_SERVICE_VERSION", "3.1.4"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "collector:4317"),
            ("OTEL_RESOURCE_ATTRIBUTES", "deployment.environment=prod, team=payments"),
            ("OTEL_EXPORTER_OTLP_TIMEOUT", "2500"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "JSON"),
        ]));

        assert_eq!(config.service_name, "orders");
        assert_eq!(config.service_version, "3.1.4");
        assert_eq!(config.collector_endpoint.as_deref(), Some("collector:4317"));
        assert_eq!(config.export_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.resource_attributes,
            vec![
                KeyValue::new("deployment.environment", "prod"),
                KeyValue::new("team", "payments"),
            ]
        );
        assert!(config.is_export_enabled());
    }

    #[test]
    fn from_lookup_sdk_disabled_turns_export_off() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "collector:4317"),
            ("OTEL_SDK_DISABLED", "TRUE"),
        ]));

        assert!(!config.enabled);
        assert!(!config.is_export_enabled());
    }

    #[test]
    fn from_lookup_ignores_malformed_values() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("OTEL_EXPORTER_OTLP_ENDPOINT", ""),
            ("OTEL_EXPORTER_OTLP_TIMEOUT", "soon"),
            ("LOG_FORMAT", "xml"),
        ]));

        assert!(config.collector_endpoint.is_none());
        assert!(config.export_timeout.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn parse_resource_attributes_skips_invalid_entries() {
        let attrs = parse_resource_attributes("a=1,,novalue,=orphan, b = 2 ");

        assert_eq!(attrs, vec![KeyValue::new("a", "1"), KeyValue::new("b", "2")]);
    }
}
