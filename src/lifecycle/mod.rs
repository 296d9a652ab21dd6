//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Root signal → Build orchestrator → Register services
//!
//! Shutdown (shutdown.rs):
//!     Trigger (caller, deadline, start failure, OS signal)
//!         → every derived signal observes it → launchers stop
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     Second SIGTERM/SIGINT → Forced exit
//! ```
//!
//! # Design Decisions
//! - One broadcast signal per run; the first trigger wins and records why
//! - Child signals never propagate upwards
//! - Shutdown has timeout: each stop is abandoned after its graceful deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownReason};
