//! Shutdown coordination for registered services.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::select_all;
use tokio::sync::watch;
use tokio::time::{self, Instant};

/// Why a shutdown signal fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Explicit request through [`Shutdown::cancel`].
    Requested,
    /// The signal's deadline elapsed.
    DeadlineExceeded,
    /// A service's start operation failed.
    StartFailed { service: String },
    /// An OS signal was received.
    Signal(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Requested => write!(f, "shutdown requested"),
            ShutdownReason::DeadlineExceeded => write!(f, "deadline exceeded"),
            ShutdownReason::StartFailed { service } => {
                write!(f, "service {} failed to start", service)
            }
            ShutdownReason::Signal(name) => write!(f, "received {}", name),
        }
    }
}

#[derive(Debug)]
struct Node {
    tx: watch::Sender<Option<ShutdownReason>>,
    deadline: Option<Instant>,
}

impl Node {
    fn new(deadline: Option<Instant>) -> Arc<Self> {
        let (tx, _) = watch::channel(None);
        Arc::new(Self { tx, deadline })
    }

    /// Record `reason` unless one is already recorded.
    fn record(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    /// The recorded reason, recording `DeadlineExceeded` once the deadline has passed.
    fn observe(&self, now: Instant) -> Option<ShutdownReason> {
        let recorded = self.tx.borrow().clone();
        if recorded.is_some() {
            return recorded;
        }
        if self.deadline.is_some_and(|deadline| deadline <= now) {
            self.record(ShutdownReason::DeadlineExceeded);
            return self.tx.borrow().clone();
        }
        None
    }
}

/// First reason found walking up `nodes`.
fn first_fired(nodes: &[Arc<Node>], now: Instant) -> Option<ShutdownReason> {
    nodes.iter().find_map(|node| node.observe(now))
}

/// Single-trigger broadcast cancellation signal.
///
/// Every clone observes the same state. A signal derived with [`Shutdown::child`]
/// fires when its parent fires, but triggering the child leaves the parent
/// untouched. The first trigger anywhere along the chain wins; later triggers
/// are no-ops.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// This signal first, then its ancestors up to the root.
    chain: Arc<[Arc<Node>]>,
}

impl Shutdown {
    /// Create a root signal that only fires when triggered.
    pub fn new() -> Self {
        Self {
            chain: Arc::from(vec![Node::new(None)]),
        }
    }

    /// Create a root signal that fires on its own once `timeout` elapses.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            chain: Arc::from(vec![Node::new(Some(Instant::now() + timeout))]),
        }
    }

    /// Derive a signal cancelled together with this one.
    pub fn child(&self) -> Self {
        self.derive(None)
    }

    /// Derive a signal that additionally fires after `timeout`.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        self.derive(Some(Instant::now() + timeout))
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.push(Node::new(deadline));
        chain.extend(self.chain.iter().cloned());
        Self {
            chain: Arc::from(chain),
        }
    }

    /// Fire the signal. Returns `true` only for the call that actually fired it.
    ///
    /// Ancestors are checked while this signal's own slot is held, so a
    /// reason inherited from an ancestor and a local trigger cannot both land.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let Some((own, ancestors)) = self.chain.split_first() else {
            return false;
        };
        let now = Instant::now();
        let mut fired = false;

        own.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            let inherited = match own.deadline {
                Some(deadline) if deadline <= now => Some(ShutdownReason::DeadlineExceeded),
                _ => first_fired(ancestors, now),
            };
            fired = inherited.is_none();
            *current = Some(inherited.unwrap_or_else(|| reason.clone()));
            true
        });

        if fired {
            tracing::debug!(reason = %reason, "Shutdown signal fired");
        }
        fired
    }

    /// Fire the signal with [`ShutdownReason::Requested`].
    pub fn cancel(&self) -> bool {
        self.trigger(ShutdownReason::Requested)
    }

    /// Whether this signal or any ancestor has fired.
    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// The reason this signal fired, if it has.
    ///
    /// Once observed, the reason never changes.
    pub fn reason(&self) -> Option<ShutdownReason> {
        let (own, ancestors) = self.chain.split_first()?;
        let now = Instant::now();
        if let Some(reason) = own.observe(now) {
            return Some(reason);
        }
        let inherited = first_fired(ancestors, now)?;
        own.record(inherited);
        own.tx.borrow().clone()
    }

    /// Wait until the signal fires and return the reason.
    pub async fn cancelled(&self) -> ShutdownReason {
        let mut receivers: Vec<_> = self.chain.iter().map(|node| node.tx.subscribe()).collect();
        let deadline = self.chain.iter().filter_map(|node| node.deadline).min();

        loop {
            if let Some(reason) = self.reason() {
                return reason;
            }

            let changed = select_all(receivers.iter_mut().map(|rx| Box::pin(rx.changed())));
            match deadline {
                Some(at) => {
                    tokio::select! {
                        _ = changed => {}
                        _ = time::sleep_until(at) => {}
                    }
                }
                None => {
                    let _ = changed.await;
                }
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trigger_wins() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_cancelled());

        assert!(shutdown.trigger(ShutdownReason::StartFailed { service: "db".into() }));
        assert!(!shutdown.cancel());
        assert_eq!(
            shutdown.reason(),
            Some(ShutdownReason::StartFailed { service: "db".into() })
        );
    }

    #[test]
    fn child_follows_parent_but_not_back() {
        let parent = Shutdown::new();
        let child = parent.child();

        assert!(child.cancel());
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.trigger(ShutdownReason::Signal("SIGTERM".into()));
        assert_eq!(other.reason(), Some(ShutdownReason::Signal("SIGTERM".into())));
        // Already fired through the parent, so the child cannot record its own.
        assert!(!other.cancel());
    }

    #[test]
    fn inherited_reason_is_kept_after_later_triggers() {
        let parent = Shutdown::new();
        let child = parent.child();

        parent.trigger(ShutdownReason::Signal("SIGINT".into()));
        assert!(!child.trigger(ShutdownReason::StartFailed { service: "db".into() }));
        assert!(!parent.cancel());
        assert_eq!(child.reason(), Some(ShutdownReason::Signal("SIGINT".into())));
    }

    #[test]
    fn concurrent_parent_and_child_triggers_agree() {
        for _ in 0..200 {
            let parent = Shutdown::new();
            let child = parent.child();

            let observer = std::thread::spawn({
                let child = child.clone();
                move || loop {
                    if let Some(reason) = child.reason() {
                        return reason;
                    }
                    std::thread::yield_now();
                }
            });
            let from_parent = std::thread::spawn({
                let parent = parent.clone();
                move || parent.trigger(ShutdownReason::Signal("SIGTERM".into()))
            });
            let child_fired = child.trigger(ShutdownReason::StartFailed { service: "db".into() });

            assert!(from_parent.join().unwrap());
            let seen = observer.join().unwrap();
            let settled = child.reason().unwrap();

            assert_eq!(seen, settled);
            if child_fired {
                assert_eq!(settled, ShutdownReason::StartFailed { service: "db".into() });
            } else {
                assert_eq!(settled, ShutdownReason::Signal("SIGTERM".into()));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_waiters() {
        let shutdown = Shutdown::with_timeout(Duration::from_secs(3));
        let started = Instant::now();

        let reason = shutdown.cancelled().await;

        assert_eq!(reason, ShutdownReason::DeadlineExceeded);
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn waiters_wake_on_parent_trigger() {
        let parent = Shutdown::new();
        let child = parent.child_with_timeout(Duration::from_secs(60));

        let waiter = tokio::spawn({
            let child = child.clone();
            async move { child.cancelled().await }
        });

        time::sleep(Duration::from_secs(1)).await;
        parent.cancel();

        let reason = waiter.await.unwrap();
        assert_eq!(reason, ShutdownReason::Requested);
    }

    #[test]
    fn reason_display() {
        let reason = ShutdownReason::StartFailed { service: "cache".into() };
        assert_eq!(reason.to_string(), "service cache failed to start");
        assert_eq!(ShutdownReason::DeadlineExceeded.to_string(), "deadline exceeded");
    }
}
