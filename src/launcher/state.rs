//! Launcher lifecycle state.
//!
//! # States
//! ```text
//! Idle → Starting:     launch() called
//! Starting → Running:  start operation returned (or no starter)
//! Running → Stopping:  shutdown signal fired
//! Stopping → Terminal: stop returned, timed out, or no stopper
//! ```
//!
//! A start that outlives the signal leaves the launcher in Stopping; states
//! never move backwards.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaunchState {
    Idle,
    Starting,
    Running,
    Stopping,
    Terminal,
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LaunchState::Idle => "idle",
            LaunchState::Starting => "starting",
            LaunchState::Running => "running",
            LaunchState::Stopping => "stopping",
            LaunchState::Terminal => "terminal",
        };
        f.write_str(s)
    }
}

/// Forward-only holder for a [`LaunchState`].
#[derive(Debug, Clone)]
pub(crate) struct StateCell {
    tx: Arc<watch::Sender<LaunchState>>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(LaunchState::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn get(&self) -> LaunchState {
        *self.tx.borrow()
    }

    /// Move to `next` if it is ahead of the current state.
    pub(crate) fn advance(&self, next: LaunchState) -> bool {
        self.tx.send_if_modified(|current| {
            if next <= *current {
                return false;
            }
            tracing::trace!(from = %current, to = %next, "Launcher state change");
            *current = next;
            true
        })
    }
}

/// One-shot boolean: starts false, set once, never cleared.
#[derive(Debug, Clone)]
pub(crate) struct Flag {
    tx: Arc<watch::Sender<bool>>,
}

impl Flag {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn set(&self) {
        self.tx.send_replace(true);
    }

    pub(crate) fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|set| *set).await;
    }
}
