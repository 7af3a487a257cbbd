use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::types::MachineId;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Logs go to stderr so
/// they never mix with the dashboard on stdout.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&observability.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    }

    tracing::debug!("Laundry tracker telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for one dashboard session
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span for an operation on a single machine
pub fn machine_span(operation: &str, machine_id: MachineId) -> tracing::Span {
    tracing::info_span!(
        "machine_operation",
        operation = operation,
        machine.id = machine_id,
    )
}

/// Span covering an interactive dashboard session
pub fn session_span(correlation_id: &str) -> tracing::Span {
    tracing::info_span!("dashboard_session", correlation.id = correlation_id)
}

pub fn shutdown_telemetry() {
    // fmt layers flush on write
    tracing::debug!("Laundry tracker telemetry shutdown complete");
}
