//! Start/stop capabilities a service may provide.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::lifecycle::Shutdown;

/// Error returned by a service's start or stop operation.
pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// A service that has work to do when launched.
#[async_trait]
pub trait Starter: Send + Sync + 'static {
    /// Start the service.
    ///
    /// The launcher considers the service started once this returns. A
    /// failure cancels `shutdown` for every service in the group.
    async fn start(&self, shutdown: &Shutdown) -> Result<(), ServiceError>;
}

/// A service that has work to do when the group shuts down.
#[async_trait]
pub trait Stopper: Send + Sync + 'static {
    /// Stop the service. `shutdown` has already fired when this is called.
    async fn stop(&self, shutdown: &Shutdown) -> Result<(), ServiceError>;
}

/// A named service ready for registration.
///
/// Either capability may be absent. A service without a starter counts as
/// started immediately, one without a stopper as stopped once shutdown fires.
#[derive(Clone)]
pub struct Service {
    name: String,
    starter: Option<Arc<dyn Starter>>,
    stopper: Option<Arc<dyn Stopper>>,
}

impl Service {
    /// A service with neither capability.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            starter: None,
            stopper: None,
        }
    }

    /// A service that both starts and stops through the same value.
    pub fn managed<S: Starter + Stopper>(name: impl Into<String>, service: Arc<S>) -> Self {
        Self::new(name)
            .with_starter(Arc::clone(&service))
            .with_stopper(service)
    }

    /// Attach a start capability.
    pub fn with_starter<S: Starter>(mut self, starter: Arc<S>) -> Self {
        self.starter = Some(starter);
        self
    }

    /// Attach a stop capability.
    pub fn with_stopper<S: Stopper>(mut self, stopper: Arc<S>) -> Self {
        self.stopper = Some(stopper);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_starter(&self) -> bool {
        self.starter.is_some()
    }

    pub fn has_stopper(&self) -> bool {
        self.stopper.is_some()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (String, Option<Arc<dyn Starter>>, Option<Arc<dyn Stopper>>) {
        (self.name, self.starter, self.stopper)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("starter", &self.has_starter())
            .field("stopper", &self.has_stopper())
            .finish()
    }
}

/// Run a start/stop future, turning a panic into an ordinary failure.
pub(crate) async fn guarded<F>(operation: F) -> Result<(), ServiceError>
where
    F: Future<Output = Result<(), ServiceError>>,
{
    match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(panic_message(payload.as_ref()).into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Starter for Noop {
        async fn start(&self, _shutdown: &Shutdown) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Stopper for Noop {
        async fn stop(&self, _shutdown: &Shutdown) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn capabilities_are_explicit() {
        let bare = Service::new("bare");
        assert!(!bare.has_starter());
        assert!(!bare.has_stopper());

        let managed = Service::managed("both", Arc::new(Noop));
        assert!(managed.has_starter());
        assert!(managed.has_stopper());

        let start_only = Service::new("start-only").with_starter(Arc::new(Noop));
        assert!(start_only.has_starter());
        assert!(!start_only.has_stopper());
        assert_eq!(start_only.name(), "start-only");
    }

    async fn explode() -> Result<(), ServiceError> {
        panic!("boom")
    }

    #[tokio::test]
    async fn guarded_converts_panics() {
        let err = guarded(explode()).await.unwrap_err();
        assert_eq!(err.to_string(), "panicked: boom");

        let shutdown = Shutdown::new();
        assert!(guarded(Noop.start(&shutdown)).await.is_ok());
    }
}
