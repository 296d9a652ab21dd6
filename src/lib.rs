//! Concurrent startup and graceful shutdown for groups of services.

pub mod config;
pub mod launcher;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod service;

pub use config::ConductorConfig;
pub use launcher::{LaunchError, LaunchErrors, Launcher};
pub use lifecycle::{Shutdown, ShutdownReason};
pub use orchestrator::Orchestrator;
pub use service::{Service, ServiceError, Starter, Stopper};
