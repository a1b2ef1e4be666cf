use opentelemetry_sdk::logs::SdkLogger;
use opentelemetry_sdk::trace::SdkTracer;
use tracing::warn;

use crate::telemetry::config::TelemetryConfig;
use crate::telemetry::error::TelemetryError;
use crate::telemetry::logging::LoggingHandle;
use crate::telemetry::subscriber::init_subscriber;
use crate::telemetry::trace::TracingHandle;

/// Log and trace pipelines built from one [`TelemetryConfig`]
#[derive(Debug, Clone)]
pub struct Telemetry {
    config: TelemetryConfig,
    logging: LoggingHandle,
    tracing: TracingHandle,
}

impl Telemetry {
    /// Build both pipelines and, with `install_globals`, install the trace pipeline
    /// process-wide.
    ///
    /// If the trace side fails after the log side was built, the log pipeline is shut
    /// down again before the error is returned.
    pub fn init(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        let telemetry = Self::build(config)?;
        telemetry.install_globals();
        Ok(telemetry)
    }

    /// Build both pipelines without touching any process-wide state
    pub fn build(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        let logging = LoggingHandle::init(&config)?;

        let tracing = match TracingHandle::build(&config) {
            Ok(tracing) => tracing,
            Err(err) => {
                if let Err(shutdown_err) = logging.shutdown() {
                    warn!(error = %shutdown_err, "failed to shutdown LoggerProvider");
                }
                return Err(err);
            }
        };

        Ok(Self::from_handles(config, logging, tracing))
    }

    /// Assemble from pipelines built elsewhere, e.g. around custom exporters
    pub fn from_handles(
        config: TelemetryConfig,
        logging: LoggingHandle,
        tracing: TracingHandle,
    ) -> Self {
        Self {
            config,
            logging,
            tracing,
        }
    }

    /// Install the tracer provider and propagator when `install_globals` is set
    pub fn install_globals(&self) {
        if self.config.install_globals {
            self.tracing.install_global();
        }
    }

    /// Install the global `tracing` subscriber wired to both pipelines
    pub fn install_subscriber(&self) -> Result<(), TelemetryError> {
        init_subscriber(&self.config, &self.logging, &self.tracing)
    }

    /// Install the subscriber, then the process-wide providers.
    ///
    /// When the subscriber cannot be installed both pipelines are shut down and no
    /// provider or propagator has been touched.
    pub fn install(self) -> Result<Self, TelemetryError> {
        if let Err(err) = self.install_subscriber() {
            // Failures are already logged by `shutdown`
            let _ = self.shutdown();
            return Err(err);
        }

        self.install_globals();
        Ok(self)
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn logging(&self) -> &LoggingHandle {
        &self.logging
    }

    pub fn tracing(&self) -> &TracingHandle {
        &self.tracing
    }

    pub fn logger(&self) -> SdkLogger {
        self.logging.logger()
    }

    pub fn tracer(&self) -> SdkTracer {
        self.tracing.tracer()
    }

    /// Shut down tracing, then logging.
    ///
    /// Both are always attempted. Each failure is logged; the first one is returned.
    pub fn shutdown(self) -> Result<(), TelemetryError> {
        let traces = self.tracing.shutdown();
        if let Err(err) = &traces {
            warn!(error = %err, "failed to shutdown TracerProvider");
        }

        let logs = self.logging.shutdown();
        if let Err(err) = &logs {
            warn!(error = %err, "failed to shutdown LoggerProvider");
        }

        traces.and(logs)
    }
}

/// Initialize telemetry with config and install the global subscriber.
///
/// On error nothing process-wide is left installed.
pub fn init_with_config(config: TelemetryConfig) -> Result<Telemetry, TelemetryError> {
    Telemetry::build(config)?.install()
}

/// Initialize telemetry from environment
pub fn init() -> Result<Telemetry, TelemetryError> {
    init_with_config(TelemetryConfig::from_env())
}
