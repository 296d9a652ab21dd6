//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Launchers and the orchestrator produce:
//!     → logging.rs (structured log events, spans per launcher and per run)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
