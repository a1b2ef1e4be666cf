use std::fmt;

use opentelemetry_otlp::ExporterBuildError;
use opentelemetry_sdk::error::OTelSdkError;

/// Telemetry signal a bootstrap is responsible for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Logs,
    Traces,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logs => "logs",
            Self::Traces => "traces",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exporter error ({signal}): {source}")]
    Exporter {
        signal: Signal,
        #[source]
        source: ExporterBuildError,
    },

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Subscriber error: {0}")]
    Subscriber(String),

    #[error("Shutdown error ({signal}): {source}")]
    Shutdown {
        signal: Signal,
        #[source]
        source: OTelSdkError,
    },
}

impl TelemetryError {
    pub(crate) fn exporter(signal: Signal) -> impl FnOnce(ExporterBuildError) -> Self {
        move |source| Self::Exporter { signal, source }
    }
}

/// Map a provider shutdown outcome, treating a repeated shutdown as success
pub(crate) fn shutdown_result(
    signal: Signal,
    result: Result<(), OTelSdkError>,
) -> Result<(), TelemetryError> {
    match result {
        Ok(()) | Err(OTelSdkError::AlreadyShutdown) => Ok(()),
        Err(source) => Err(TelemetryError::Shutdown { signal, source }),
    }
}
