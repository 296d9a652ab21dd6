//! Service capabilities.
//!
//! # Design Decisions
//! - Start and stop are separate traits; a service opts into each explicitly
//! - Capabilities are attached when the [`Service`] record is built, so the
//!   orchestrator never probes values at runtime
//! - Errors are boxed trait objects so services keep their own error types

pub mod capability;
pub mod scripted;

pub use capability::{Service, ServiceError, Starter, Stopper};
pub use scripted::ScriptedService;
