//! Shared fixtures for orchestrator integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conductor::{Service, ServiceError, Shutdown, Starter, Stopper};
use parking_lot::Mutex;
use tokio::time::Instant;

/// How a test service's start operation behaves.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum StartMode {
    Immediate,
    Delay(Duration),
    Fail,
    UntilShutdown,
}

/// How a test service's stop operation behaves.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum StopMode {
    Ok,
    Fail,
    Hang,
}

#[derive(Debug, Clone)]
pub struct Record {
    pub service: String,
    pub event: &'static str,
    pub at: Instant,
}

/// Timeline of lifecycle events across all test services in a test.
#[derive(Debug, Default)]
pub struct Journal {
    records: Mutex<Vec<Record>>,
}

#[allow(dead_code)]
impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn log(&self, service: &str, event: &'static str) {
        self.records.lock().push(Record {
            service: service.to_string(),
            event,
            at: Instant::now(),
        });
    }

    pub fn find(&self, service: &str, event: &str) -> Option<Record> {
        self.records
            .lock()
            .iter()
            .find(|r| r.service == service && r.event == event)
            .cloned()
    }

    pub fn count(&self, event: &str) -> usize {
        self.records.lock().iter().filter(|r| r.event == event).count()
    }
}

/// Test service with scripted start/stop behaviour.
pub struct TestService {
    name: String,
    start: StartMode,
    stop: StopMode,
    journal: Arc<Journal>,
}

#[allow(dead_code)]
impl TestService {
    fn shared(name: &str, start: StartMode, stop: StopMode, journal: &Arc<Journal>) -> Arc<Self> {
        Arc::new(TestService {
            name: name.to_string(),
            start,
            stop,
            journal: Arc::clone(journal),
        })
    }

    /// Service with both a start and a stop operation.
    pub fn service(
        name: &str,
        start: StartMode,
        stop: StopMode,
        journal: &Arc<Journal>,
    ) -> Service {
        Service::managed(name, Self::shared(name, start, stop, journal))
    }

    /// Service with only a start operation.
    pub fn starter(name: &str, start: StartMode, journal: &Arc<Journal>) -> Service {
        Service::new(name).with_starter(Self::shared(name, start, StopMode::Ok, journal))
    }

    /// Service with only a stop operation.
    pub fn stopper(name: &str, stop: StopMode, journal: &Arc<Journal>) -> Service {
        Service::new(name).with_stopper(Self::shared(name, StartMode::Immediate, stop, journal))
    }
}

#[async_trait]
impl Starter for TestService {
    async fn start(&self, shutdown: &Shutdown) -> Result<(), ServiceError> {
        self.journal.log(&self.name, "start");
        match self.start {
            StartMode::Immediate => {}
            StartMode::Delay(delay) => tokio::time::sleep(delay).await,
            StartMode::Fail => {
                self.journal.log(&self.name, "start_failed");
                return Err(format!("{} cannot bind", self.name).into());
            }
            StartMode::UntilShutdown => {
                shutdown.cancelled().await;
            }
        }
        self.journal.log(&self.name, "started");
        Ok(())
    }
}

#[async_trait]
impl Stopper for TestService {
    async fn stop(&self, _shutdown: &Shutdown) -> Result<(), ServiceError> {
        self.journal.log(&self.name, "stop");
        match self.stop {
            StopMode::Ok => Ok(()),
            StopMode::Fail => Err(format!("{} left files behind", self.name).into()),
            StopMode::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}
