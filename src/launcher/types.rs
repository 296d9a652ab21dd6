//! Launcher error definitions.

use std::fmt;

use thiserror::Error;

use crate::service::ServiceError;

/// Failure reported by a single launcher.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The start operation failed or panicked.
    #[error("{service}: start failed: {source}")]
    Start {
        service: String,
        #[source]
        source: ServiceError,
    },

    /// The stop operation failed or panicked.
    #[error("{service}: stop failed: {source}")]
    Stop {
        service: String,
        #[source]
        source: ServiceError,
    },

    /// `launch()` was called on a launcher that already ran.
    #[error("{service}: already launched")]
    AlreadyLaunched { service: String },

    /// The launcher task itself died.
    #[error("{service}: launcher task aborted: {reason}")]
    Aborted { service: String, reason: String },
}

impl LaunchError {
    /// Name of the service the error belongs to.
    pub fn service(&self) -> &str {
        match self {
            LaunchError::Start { service, .. }
            | LaunchError::Stop { service, .. }
            | LaunchError::AlreadyLaunched { service }
            | LaunchError::Aborted { service, .. } => service,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, LaunchError::Start { .. })
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, LaunchError::Stop { .. })
    }
}

/// Ordered collection of launcher failures.
///
/// Only ever handed out non-empty: a run or launch without failures returns
/// `Ok(())` instead.
#[derive(Debug, Default)]
pub struct LaunchErrors(Vec<LaunchError>);

impl LaunchErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: LaunchError) {
        self.0.push(error);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LaunchError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<LaunchError> {
        self.0
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), LaunchErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for LaunchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "launchers: [")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        write!(f, "]")
    }
}

impl std::error::Error for LaunchErrors {}

impl From<LaunchError> for LaunchErrors {
    fn from(error: LaunchError) -> Self {
        Self(vec![error])
    }
}

impl Extend<LaunchError> for LaunchErrors {
    fn extend<I: IntoIterator<Item = LaunchError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for LaunchErrors {
    type Item = LaunchError;
    type IntoIter = std::vec::IntoIter<LaunchError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LaunchErrors {
    type Item = &'a LaunchError;
    type IntoIter = std::slice::Iter<'a, LaunchError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result type for launcher operations.
pub type LaunchResult = Result<(), LaunchErrors>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LaunchError::Start {
            service: "db".into(),
            source: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "db: start failed: connection refused");
        assert_eq!(err.service(), "db");
        assert!(err.is_start());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn aggregate_display_and_result() {
        assert!(LaunchErrors::new().into_result().is_ok());

        let mut errors = LaunchErrors::from(LaunchError::AlreadyLaunched {
            service: "api".into(),
        });
        errors.push(LaunchError::Stop {
            service: "cache".into(),
            source: "flush failed".into(),
        });

        assert_eq!(
            errors.to_string(),
            "launchers: [api: already launched; cache: stop failed: flush failed]"
        );
        let errors = errors.into_result().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(LaunchError::is_stop));
    }
}
