//! Launcher subsystem.
//!
//! # Data Flow
//! ```text
//! launch():
//!     spawn start (if any) → started flag set when it returns
//!         → on failure: record error, trigger shared shutdown
//!     wait for shared shutdown
//!     spawn stop (if any) → race against graceful timeout
//!     → stopped flag set → combined errors returned
//! ```
//!
//! # Design Decisions
//! - Start runs in its own task so a long-running start never delays stop
//! - Stop overrunning the graceful timeout is abandoned, not reported
//! - Flags are one-shot watch channels; waiters are woken, never poll

pub mod runner;
pub mod state;
pub mod types;

pub use runner::Launcher;
pub use state::LaunchState;
pub use types::{LaunchError, LaunchErrors, LaunchResult};
