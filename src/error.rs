//! Top-level error type.

use thiserror::Error;

use crate::config::{ConfigError, TimeError};
use crate::filter::FilterParseError;
use crate::monitoring::MonitoringError;

/// Any error that ends a run.
#[derive(Debug, Error)]
pub enum TracerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Filter(#[from] FilterParseError),

    #[error(transparent)]
    Monitoring(#[from] MonitoringError),

    #[error("unable to write output: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        let err: TracerError = FilterParseError::InvalidEntry("abc".into()).into();
        assert_eq!(
            err.to_string(),
            FilterParseError::InvalidEntry("abc".into()).to_string()
        );

        let err: TracerError = MonitoringError::Unavailable("down".into()).into();
        assert_eq!(err.to_string(), "monitoring unavailable: down");
    }
}
