use opentelemetry::{InstrumentationScope, KeyValue};
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use opentelemetry_semantic_conventions::SCHEMA_URL;

use crate::telemetry::config::TelemetryConfig;

/// Get base attributes for any resource
pub fn base_attributes(config: &TelemetryConfig) -> Vec<KeyValue> {
    vec![
        KeyValue::new(SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(SERVICE_VERSION, config.service_version.clone()),
    ]
}

/// Build the resource attached to every exported record.
///
/// Holds exactly the service identity plus `config.resource_attributes`, no SDK
/// detectors. Caller attributes are applied last so they win on key collision.
pub fn build_resource(config: &TelemetryConfig) -> Resource {
    let mut attrs = base_attributes(config);
    attrs.extend(config.resource_attributes.iter().cloned());
    Resource::builder_empty()
        .with_schema_url(attrs, SCHEMA_URL)
        .build()
}

/// Scope under which a handle's logger or tracer reports
pub(crate) fn instrumentation_scope(name: &str, version: &str) -> InstrumentationScope {
    InstrumentationScope::builder(name.to_string())
        .with_version(version.to_string())
        .with_schema_url(SCHEMA_URL)
        .build()
}
