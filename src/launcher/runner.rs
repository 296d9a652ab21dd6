//! Per-service lifecycle driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::launcher::state::{Flag, LaunchState, StateCell};
use crate::launcher::types::{LaunchError, LaunchErrors, LaunchResult};
use crate::lifecycle::{Shutdown, ShutdownReason};
use crate::observability::metrics::{self, StopOutcome};
use crate::service::capability::guarded;
use crate::service::{Service, ServiceError, Starter, Stopper};

/// Drives one service through start, run-until-shutdown, and bounded stop.
pub struct Launcher {
    name: String,
    shutdown: Shutdown,
    starter: Option<Arc<dyn Starter>>,
    stopper: Option<Arc<dyn Stopper>>,
    graceful_timeout: Duration,
    started: Flag,
    stopped: Flag,
    state: StateCell,
    launched: AtomicBool,
}

impl Launcher {
    pub fn new(
        name: impl Into<String>,
        shutdown: Shutdown,
        starter: Option<Arc<dyn Starter>>,
        stopper: Option<Arc<dyn Stopper>>,
        graceful_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            shutdown,
            starter,
            stopper,
            graceful_timeout,
            started: Flag::new(),
            stopped: Flag::new(),
            state: StateCell::new(),
            launched: AtomicBool::new(false),
        }
    }

    /// Build a launcher from a registration record.
    pub fn for_service(service: Service, shutdown: Shutdown, graceful_timeout: Duration) -> Self {
        let (name, starter, stopper) = service.into_parts();
        Self::new(name, shutdown, starter, stopper, graceful_timeout)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LaunchState {
        self.state.get()
    }

    pub fn is_started(&self) -> bool {
        self.started.is_set()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_set()
    }

    /// Wait until the start operation has returned.
    pub async fn wait_start(&self) {
        self.started.wait().await
    }

    /// Wait until the stop phase has finished or been abandoned.
    pub async fn wait_stop(&self) {
        self.stopped.wait().await
    }

    /// Run the service's whole lifecycle.
    ///
    /// Returns once the shared shutdown signal has fired and the stop phase
    /// is over. The start result is collected after the stop phase, so a
    /// start failure is reported even when the signal had already fired.
    /// Start failures are listed before stop failures. A start or stop that
    /// overruns the graceful timeout is abandoned without an error.
    pub async fn launch(&self) -> LaunchResult {
        if self.launched.swap(true, Ordering::SeqCst) {
            return Err(LaunchError::AlreadyLaunched {
                service: self.name.clone(),
            }
            .into());
        }

        self.state.advance(LaunchState::Starting);
        metrics::record_running(1.0);
        let start = self.spawn_start();

        let reason = self.shutdown.cancelled().await;
        self.state.advance(LaunchState::Stopping);
        tracing::debug!(reason = %reason, "Stopping service");

        let mut errors = LaunchErrors::new();
        let stop_failure = self.run_stop().await;

        if let Some(source) = self.join_start(start).await {
            errors.push(LaunchError::Start {
                service: self.name.clone(),
                source,
            });
        }
        if let Some(source) = stop_failure {
            errors.push(LaunchError::Stop {
                service: self.name.clone(),
                source,
            });
        }

        metrics::record_running(-1.0);
        self.stopped.set();
        self.state.advance(LaunchState::Terminal);
        tracing::debug!(errors = errors.len(), "Service terminated");

        errors.into_result()
    }

    /// Kick off the start operation without waiting for it.
    ///
    /// Returns `None` when the service has no start operation.
    fn spawn_start(&self) -> Option<JoinHandle<Result<(), ServiceError>>> {
        let Some(starter) = self.starter.clone() else {
            self.started.set();
            self.state.advance(LaunchState::Running);
            return None;
        };

        let name = self.name.clone();
        let shutdown = self.shutdown.clone();
        let started = self.started.clone();
        let state = self.state.clone();

        let handle = tokio::spawn(
            async move {
                let result = guarded(starter.start(&shutdown)).await;
                metrics::record_start(&name, result.is_ok());

                match &result {
                    Ok(()) => tracing::info!("Service started"),
                    Err(source) => {
                        tracing::error!(error = %source, "Service failed to start");
                        shutdown.trigger(ShutdownReason::StartFailed { service: name });
                    }
                }

                started.set();
                state.advance(LaunchState::Running);
                result
            }
            .in_current_span(),
        );

        Some(handle)
    }

    /// Collect the start result once stopping is over.
    ///
    /// A start still running after the graceful timeout is detached and its
    /// result dropped.
    async fn join_start(
        &self,
        start: Option<JoinHandle<Result<(), ServiceError>>>,
    ) -> Option<ServiceError> {
        let start = start?;

        match tokio::time::timeout(self.graceful_timeout, start).await {
            Ok(Ok(result)) => result.err(),
            Ok(Err(join_error)) => {
                tracing::error!(error = %join_error, "Start task died");
                Some(join_error.to_string().into())
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.graceful_timeout,
                    "Start still running after graceful timeout, abandoning"
                );
                None
            }
        }
    }

    /// Run the stop operation against the graceful timeout.
    async fn run_stop(&self) -> Option<ServiceError> {
        let stopper = self.stopper.clone()?;
        let shutdown = self.shutdown.clone();

        let stop = tokio::spawn(
            async move { guarded(stopper.stop(&shutdown)).await }.in_current_span(),
        );

        match tokio::time::timeout(self.graceful_timeout, stop).await {
            Ok(Ok(Ok(()))) => {
                metrics::record_stop(&self.name, StopOutcome::Ok);
                tracing::info!("Service stopped");
                None
            }
            Ok(Ok(Err(source))) => {
                metrics::record_stop(&self.name, StopOutcome::Error);
                tracing::error!(error = %source, "Service failed to stop");
                Some(source)
            }
            Ok(Err(join_error)) => {
                metrics::record_stop(&self.name, StopOutcome::Error);
                tracing::error!(error = %join_error, "Stop task died");
                Some(join_error.to_string().into())
            }
            Err(_) => {
                metrics::record_stop(&self.name, StopOutcome::Timeout);
                tracing::warn!(
                    timeout = ?self.graceful_timeout,
                    "Stop exceeded graceful timeout, abandoning"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("started", &self.is_started())
            .field("stopped", &self.is_stopped())
            .field("graceful_timeout", &self.graceful_timeout)
            .finish()
    }
}

/// Span every launcher's work runs in.
pub(crate) fn launcher_span(name: &str) -> tracing::Span {
    tracing::info_span!("launcher", service = %name)
}

/// Launch inside the launcher's own span.
pub(crate) async fn launch_instrumented(launcher: &Launcher) -> LaunchResult {
    launcher.launch().instrument(launcher_span(launcher.name())).await
}
