//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Detect duplicate service names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConductorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ConductorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("orchestrator.graceful_timeout_ms must be greater than 0")]
    ZeroGracefulTimeout,

    #[error("orchestrator.run_timeout_secs must be greater than 0 when set")]
    ZeroRunTimeout,

    #[error("services[{index}].name must not be empty")]
    EmptyServiceName { index: usize },

    #[error("duplicate service name: {0}")]
    DuplicateServiceName(String),

    #[error("invalid metrics address: {0}")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ConductorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.orchestrator.graceful_timeout_ms == 0 {
        errors.push(ValidationError::ZeroGracefulTimeout);
    }
    if config.orchestrator.run_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroRunTimeout);
    }

    let mut seen = HashSet::new();
    for (index, service) in config.services.iter().enumerate() {
        if service.name.trim().is_empty() {
            errors.push(ValidationError::EmptyServiceName { index });
        } else if !seen.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateServiceName(service.name.clone()));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServiceConfig;

    fn service(name: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ConductorConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ConductorConfig::default();
        config.orchestrator.graceful_timeout_ms = 0;
        config.orchestrator.run_timeout_secs = Some(0);
        config.services = vec![service("db"), service(""), service("db")];
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-address".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroGracefulTimeout,
                ValidationError::ZeroRunTimeout,
                ValidationError::EmptyServiceName { index: 1 },
                ValidationError::DuplicateServiceName("db".into()),
                ValidationError::InvalidMetricsAddress("not-an-address".into()),
            ]
        );
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = ConductorConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());
    }
}
