//! Fan-out over every registered launcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::schema::{OrchestratorConfig, DEFAULT_GRACEFUL_TIMEOUT};
use crate::launcher::runner::launch_instrumented;
use crate::launcher::{LaunchError, LaunchErrors, Launcher};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::orchestrator::registry::Registry;
use crate::service::Service;

/// Starts a group of services together and stops them together.
///
/// All launchers share one shutdown signal derived from the parent passed to
/// [`Orchestrator::new`]. It fires when the parent fires, when
/// [`Shutdown::cancel`] is called on [`Orchestrator::shutdown`], or when any
/// service fails to start.
#[derive(Debug)]
pub struct Orchestrator {
    shutdown: Shutdown,
    graceful_timeout: Duration,
    registry: Registry,
    run_id: Uuid,
}

impl Orchestrator {
    /// Create an orchestrator bound to `parent` with the default 5s graceful timeout.
    pub fn new(parent: &Shutdown) -> Self {
        Self::with_graceful_timeout(parent, DEFAULT_GRACEFUL_TIMEOUT)
    }

    pub fn with_config(parent: &Shutdown, config: &OrchestratorConfig) -> Self {
        Self::with_graceful_timeout(parent, config.graceful_timeout())
    }

    pub fn with_graceful_timeout(parent: &Shutdown, graceful_timeout: Duration) -> Self {
        Self {
            shutdown: parent.child(),
            graceful_timeout,
            registry: Registry::default(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Handle to the shared signal, for triggering or observing shutdown.
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Launchers in registration order; they stay observable after `run` consumes `self`.
    pub fn launchers(&self) -> Vec<Arc<Launcher>> {
        self.registry
            .entries()
            .into_iter()
            .map(|entry| entry.launcher)
            .collect()
    }

    /// Register a service; `run` waits for its start before launching the next one.
    pub fn register(&self, service: Service) {
        self.push(service, false);
    }

    /// Register a service without waiting for its start.
    pub fn register_background(&self, service: Service) {
        self.push(service, true);
    }

    fn push(&self, service: Service, background: bool) {
        tracing::debug!(
            service = %service.name(),
            background,
            starter = service.has_starter(),
            stopper = service.has_stopper(),
            "Service registered"
        );
        let launcher = Launcher::for_service(service, self.shutdown.clone(), self.graceful_timeout);
        self.registry.push(launcher, background);
    }

    /// Launch every registered service and wait until all of them are done.
    ///
    /// Services are launched in registration order. After launching a
    /// foreground service, `run` waits for its start to return before
    /// launching the next one. Returns `Ok(())` when no service reported a
    /// failure.
    pub async fn run(self) -> Result<(), LaunchErrors> {
        let span = tracing::info_span!("orchestrator", run_id = %self.run_id);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) -> Result<(), LaunchErrors> {
        let started_at = Instant::now();
        let entries = self.registry.entries();
        tracing::info!(services = entries.len(), "Launching services");

        let errors = Arc::new(Mutex::new(LaunchErrors::new()));
        let mut tasks = JoinSet::new();
        let mut names = HashMap::new();

        for entry in entries {
            let launcher = Arc::clone(&entry.launcher);
            let collected = Arc::clone(&errors);

            let handle = tasks.spawn(
                async move {
                    if let Err(failures) = launch_instrumented(&launcher).await {
                        collected.lock().extend(failures);
                    }
                    launcher.wait_stop().await;
                }
                .in_current_span(),
            );
            names.insert(handle.id(), entry.launcher.name().to_string());

            if !entry.background {
                entry.launcher.wait_start().await;
                tracing::debug!(service = %entry.launcher.name(), "Foreground service started");
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(join_error) = joined {
                let service = names
                    .get(&join_error.id())
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::error!(service = %service, error = %join_error, "Launcher task aborted");
                errors.lock().push(LaunchError::Aborted {
                    service,
                    reason: join_error.to_string(),
                });
            }
        }

        metrics::record_run(started_at);
        let errors = std::mem::take(&mut *errors.lock());
        if errors.is_empty() {
            tracing::info!("All services stopped cleanly");
        } else {
            tracing::warn!(failures = errors.len(), errors = %errors, "Services stopped with failures");
        }
        errors.into_result()
    }
}
