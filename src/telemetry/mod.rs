//! Logging and tracing bootstrap for OpenTelemetry.
//!
//! Configures the OpenTelemetry SDK to export logs and spans to a collector over
//! insecure OTLP/gRPC, or falls back to no-op pipelines when no collector endpoint
//! is configured.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! // Configure from environment and install the global subscriber
//! let telemetry = telemetry::init()?;
//!
//! tracing::info!("service started");
//!
//! telemetry.shutdown()?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use opentelemetry::KeyValue;
//! use telemetry::{Telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("orders")
//!     .service_version("1.0.0")
//!     .collector_endpoint("localhost:4317") // empty = disabled
//!     .resource_attribute(KeyValue::new("deployment.environment", "prod"))
//!     .json()
//!     .build();
//!
//! // Subscriber first, then the global tracer provider; a failure installs nothing
//! let telemetry = Telemetry::build(config)?.install()?;
//! ```
//!
//! The exporting path must run inside a multi-threaded Tokio runtime: the gRPC channel
//! is spawned onto it, and shutdown blocks while batches are flushed.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `OTEL_SERVICE_NAME` | Service name | `CARGO_PKG_NAME` |
//! | `OTEL_SERVICE_VERSION` | Service version | `CARGO_PKG_VERSION` |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | Collector `host:port` | - (disabled) |
//! | `OTEL_EXPORTER_OTLP_TIMEOUT` | Export timeout in ms | SDK default |
//! | `OTEL_RESOURCE_ATTRIBUTES` | `key=value,...` | - |
//! | `OTEL_SDK_DISABLED` | `true` forces no-op pipelines | `false` |
//! | `RUST_LOG` | Log level filter | `info` |
//! | `LOG_FORMAT` | `pretty` or `json` | `pretty` |
//!
//! # Module Structure
//!
//! - [`api`]: [`Telemetry`] and initialization functions
//! - [`config`]: Configuration types
//! - [`error`]: Error types
//! - [`exporter`]: OTLP/gRPC exporters and endpoint validation
//! - [`logging`]: Log pipeline and the `tracing` bridge
//! - [`trace`]: Trace pipeline and propagator
//! - [`resource`]: Resource descriptor
//! - [`subscriber`]: Global `tracing` subscriber composition

pub mod api;
pub mod config;
pub mod error;
pub mod exporter;
pub mod logging;
pub mod resource;
pub mod subscriber;
pub mod trace;

// Re-exports
pub use api::{init, init_with_config, Telemetry};
pub use config::{LogFormat, TelemetryConfig, TelemetryConfigBuilder};
pub use error::{Signal, TelemetryError};
pub use logging::LoggingHandle;
pub use trace::{global_tracer, TracingHandle};
