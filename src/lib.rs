pub mod telemetry;

pub use telemetry::{
    global_tracer, init, init_with_config, LogFormat, LoggingHandle, Signal, Telemetry,
    TelemetryConfig, TelemetryConfigBuilder, TelemetryError, TracingHandle,
};
