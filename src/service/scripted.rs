//! Config-driven service used by the `conductor` binary.
//!
//! Each [`ScriptedService`] simulates a real dependency: it takes a while to
//! start, may fail on either side, and may refuse to stop in time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ServiceConfig;
use crate::lifecycle::Shutdown;
use crate::service::capability::{Service, ServiceError, Starter, Stopper};

#[derive(Debug, Clone)]
pub struct ScriptedService {
    config: ServiceConfig,
}

impl ScriptedService {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Wrap into a registrable [`Service`] exposing both capabilities.
    pub fn into_service(self) -> Service {
        let name = self.config.name.clone();
        Service::managed(name, Arc::new(self))
    }
}

#[async_trait]
impl Starter for ScriptedService {
    async fn start(&self, shutdown: &Shutdown) -> Result<(), ServiceError> {
        let delay = Duration::from_millis(self.config.start_delay_ms);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            reason = shutdown.cancelled() => {
                tracing::debug!(service = %self.config.name, reason = %reason, "Start interrupted");
                return Ok(());
            }
        }

        if self.config.fail_start {
            return Err(format!("{} refused to start", self.config.name).into());
        }
        tracing::info!(service = %self.config.name, "Scripted service ready");
        Ok(())
    }
}

#[async_trait]
impl Stopper for ScriptedService {
    async fn stop(&self, _shutdown: &Shutdown) -> Result<(), ServiceError> {
        if self.config.hang_on_stop {
            std::future::pending::<()>().await;
        }

        tokio::time::sleep(Duration::from_millis(self.config.stop_delay_ms)).await;

        if self.config.fail_stop {
            return Err(format!("{} failed to release resources", self.config.name).into());
        }
        Ok(())
    }
}
