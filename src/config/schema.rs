//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for conductor.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Graceful shutdown budget applied to every launcher unless configured.
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(5);

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConductorConfig {
    /// Orchestrator settings.
    pub orchestrator: OrchestratorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Scripted services run by the binary.
    pub services: Vec<ServiceConfig>,
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// How long a stop operation may run before it is abandoned, in milliseconds.
    pub graceful_timeout_ms: u64,

    /// Optional deadline for the whole run, in seconds.
    pub run_timeout_secs: Option<u64>,
}

impl OrchestratorConfig {
    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_millis(self.graceful_timeout_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            graceful_timeout_ms: u64::try_from(DEFAULT_GRACEFUL_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
            run_timeout_secs: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// A scripted service definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service identifier for logging/metrics.
    pub name: String,

    /// Register without waiting for the start to complete.
    pub background: bool,

    /// Time the start operation takes, in milliseconds.
    pub start_delay_ms: u64,

    /// Make the start operation fail.
    pub fail_start: bool,

    /// Time the stop operation takes, in milliseconds.
    pub stop_delay_ms: u64,

    /// Make the stop operation fail.
    pub fail_stop: bool,

    /// Never return from the stop operation.
    pub hang_on_stop: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConductorConfig::default();
        assert_eq!(config.orchestrator.graceful_timeout_ms, 5000);
        assert_eq!(config.orchestrator.graceful_timeout(), DEFAULT_GRACEFUL_TIMEOUT);
        assert!(config.orchestrator.run_timeout().is_none());
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.services.is_empty());
    }

    #[test]
    fn parses_minimal_toml() {
        let config: ConductorConfig = toml::from_str(
            r#"
            [orchestrator]
            run_timeout_secs = 10

            [observability]
            log_format = "json"

            [[services]]
            name = "db"
            start_delay_ms = 250

            [[services]]
            name = "worker"
            background = true
            hang_on_stop = true
            "#,
        )
        .unwrap();

        assert_eq!(config.orchestrator.graceful_timeout_ms, 5000);
        assert_eq!(config.orchestrator.run_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[0].start_delay_ms, 250);
        assert!(!config.services[0].background);
        assert!(config.services[1].background);
        assert!(config.services[1].hang_on_stop);
    }
}
