//! Registration list shared between `register` calls and `run`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::launcher::Launcher;

/// A launcher and how the orchestrator waits on it.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) launcher: Arc<Launcher>,
    pub(crate) background: bool,
}

/// Append-only list of registrations.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: Mutex<Vec<Entry>>,
}

impl Registry {
    pub(crate) fn push(&self, launcher: Launcher, background: bool) {
        self.entries.lock().push(Entry {
            launcher: Arc::new(launcher),
            background,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Snapshot of the entries in registration order.
    pub(crate) fn entries(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }
}
