//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic checks on flags and the resolved stack (clap and serde handle syntax)
//! - Reject TLS material the client cannot load
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: (Args, Datasource) → Result<(), Vec<ValidationError>>
//! - Runs before any network traffic

use thiserror::Error;
use url::Url;

use crate::config::args::Args;
use crate::config::schema::Datasource;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no monitoring url configured for stack {0:?}")]
    MissingMonitoringUrl(String),

    #[error("invalid monitoring url {url:?}: {reason}")]
    InvalidMonitoringUrl { url: String, reason: String },

    #[error("--limit must be greater than 0")]
    ZeroLimit,

    #[error("--lines must be greater than 0")]
    ZeroLines,

    #[error("log mode needs at least one --service or a --log-filter")]
    EmptyLogQuery,

    #[error("client certificate and key must be provided together")]
    IncompleteClientCert,
}

/// Validate the flags against the resolved datasource.
pub fn validate(args: &Args, datasource: &Datasource) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if datasource.monitoring_url.is_empty() {
        errors.push(ValidationError::MissingMonitoringUrl(datasource.name.clone()));
    } else if let Err(e) = Url::parse(&datasource.monitoring_url) {
        errors.push(ValidationError::InvalidMonitoringUrl {
            url: datasource.monitoring_url.clone(),
            reason: e.to_string(),
        });
    }

    if args.traces.limit == 0 {
        errors.push(ValidationError::ZeroLimit);
    }

    if args.logs.is_active() {
        if args.logs.lines == 0 {
            errors.push(ValidationError::ZeroLines);
        }
        let has_filter = args.logs.log_filter.as_deref().is_some_and(|f| !f.is_empty());
        if args.filters.services.is_empty() && !has_filter {
            errors.push(ValidationError::EmptyLogQuery);
        }
    }

    if datasource.monitoring_cert_path.is_some() != datasource.monitoring_cert_key_path.is_some() {
        errors.push(ValidationError::IncompleteClientCert);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
