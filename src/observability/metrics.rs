//! Metrics collection and exposition.
//!
//! # Metrics
//! - `conductor_service_starts_total` (counter): start results by service, outcome
//! - `conductor_service_stops_total` (counter): stop results by service, outcome
//! - `conductor_services_running` (gauge): launchers launched and not yet terminal
//! - `conductor_run_duration_seconds` (histogram): wall time of `Orchestrator::run`
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is opt-in from configuration

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// How a stop phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Ok,
    Error,
    Timeout,
}

impl StopOutcome {
    fn as_str(self) -> &'static str {
        match self {
            StopOutcome::Ok => "ok",
            StopOutcome::Error => "error",
            StopOutcome::Timeout => "timeout",
        }
    }
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_start(service: &str, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    ::metrics::counter!(
        "conductor_service_starts_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_stop(service: &str, outcome: StopOutcome) {
    ::metrics::counter!(
        "conductor_service_stops_total",
        "service" => service.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_running(delta: f64) {
    ::metrics::gauge!("conductor_services_running").increment(delta);
}

pub fn record_run(started: Instant) {
    ::metrics::histogram!("conductor_run_duration_seconds").record(started.elapsed().as_secs_f64());
}
