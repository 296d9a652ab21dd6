//! Orchestrator subsystem.
//!
//! # Data Flow
//! ```text
//! register / register_background
//!     → registry.rs (append under mutex)
//!
//! run():
//!     for each entry in order:
//!         spawn launcher task (launch → collect errors → wait_stop)
//!         foreground: wait for its start before continuing
//!     wait for every task → Ok(()) or LaunchErrors
//! ```
//!
//! # Design Decisions
//! - One shared shutdown signal; the first start failure stops everyone
//! - No ordering on stop: every stopper sees the same signal at once
//! - `run` consumes the orchestrator so it cannot run twice

pub mod coordinator;
mod registry;

pub use coordinator::Orchestrator;
