//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT and SIGTERM
//! - Translate the first one into a shutdown trigger
//! - Force exit on a second one
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Multiple SIGTERM/SIGINT triggers forced shutdown

use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};

/// Exit status used when a second signal forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Wait for the next SIGINT or SIGTERM and return its name.
async fn next_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "SIGINT")
    }
}

/// Trigger `shutdown` on the first OS signal, exit the process on the second.
///
/// Intended to be spawned as a background task for the lifetime of the binary.
pub async fn watch_signals(shutdown: Shutdown) {
    match next_signal().await {
        Ok(name) => {
            tracing::info!(signal = name, "Signal received, starting graceful shutdown");
            shutdown.trigger(ShutdownReason::Signal(name.to_string()));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handler");
            return;
        }
    }

    if let Ok(name) = next_signal().await {
        tracing::error!(signal = name, "Second signal received, forcing exit");
        std::process::exit(FORCED_EXIT_CODE);
    }
}
