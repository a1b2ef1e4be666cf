use std::process::ExitCode;

use opentelemetry::logs::{LogRecord, Logger, Severity};
use otel_bootstrap::{init_with_config, TelemetryConfig};
use tracing::{info, info_span, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Collector from OTEL_EXPORTER_OTLP_ENDPOINT; no-op pipelines when unset
    let config = TelemetryConfig::from_env();

    let telemetry = match init_with_config(config) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("failed to initialize telemetry: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = telemetry.config().service_name.as_str(),
        exporting = telemetry.tracing().is_exporting(),
        "Telemetry initialized"
    );

    {
        let _span = info_span!("startup_check", attempt = 1).entered();
        info!("Emitting startup span and log records");
        warn!(reason = "demo", "This warning is mirrored into the log pipeline");
    }

    let logger = telemetry.logger();
    let mut record = logger.create_log_record();
    record.set_severity_number(Severity::Info);
    record.set_body("direct log record".into());
    logger.emit(record);

    // Shutdown runs on a blocking thread so the gRPC transport keeps the runtime workers
    let outcome = tokio::task::spawn_blocking(move || telemetry.shutdown()).await;

    match outcome {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            eprintln!("telemetry shutdown failed: {err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("telemetry shutdown task panicked: {err}");
            ExitCode::FAILURE
        }
    }
}
