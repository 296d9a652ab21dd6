//! Startup orchestration.
//!
//! # Responsibilities
//! - Derive the root shutdown signal from configuration
//! - Build an orchestrator and register every configured service
//!
//! # Design Decisions
//! - Services register in file order; that order is the start order
//! - Background services are flagged per entry, not per group

use crate::config::ConductorConfig;
use crate::lifecycle::shutdown::Shutdown;
use crate::orchestrator::Orchestrator;
use crate::service::ScriptedService;

/// Root signal for a run: bounded by `run_timeout_secs` when configured.
pub fn root_signal(config: &ConductorConfig) -> Shutdown {
    match config.orchestrator.run_timeout() {
        Some(timeout) => Shutdown::with_timeout(timeout),
        None => Shutdown::new(),
    }
}

/// Build an orchestrator under `parent` with one scripted service per entry.
pub fn build_orchestrator(config: &ConductorConfig, parent: &Shutdown) -> Orchestrator {
    let orchestrator = Orchestrator::with_config(parent, &config.orchestrator);

    for service in &config.services {
        let background = service.background;
        let service = ScriptedService::new(service.clone()).into_service();
        if background {
            orchestrator.register_background(service);
        } else {
            orchestrator.register(service);
        }
    }

    tracing::info!(
        services = orchestrator.len(),
        graceful_timeout_ms = config.orchestrator.graceful_timeout_ms,
        "Orchestrator ready"
    );
    orchestrator
}
