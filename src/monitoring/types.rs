//! Backend-facing types and error definitions.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the monitoring stack.
#[derive(Debug, Error)]
pub enum MonitoringError {
    /// Health check failed or the endpoint could not be reached.
    #[error("monitoring unavailable: {0}")]
    Unavailable(String),

    /// Base URL or endpoint URL could not be built.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// TLS material could not be read.
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport, TLS or body read failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape.
    #[error("unable to decode response: {0}")]
    Decode(String),

    /// Request parameters could not be encoded.
    #[error("unable to encode query parameters: {0}")]
    Encode(String),

    /// Backend rejected the query.
    #[error("query failed ({error_type}): {message}")]
    Query { error_type: String, message: String },
}

/// Result type for monitoring operations.
pub type MonitoringResult<T> = Result<T, MonitoringError>;

/// One labeled numeric sample of an instant vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub labels: HashMap<String, String>,
    pub value: f64,
}

impl Sample {
    pub fn new<const N: usize>(labels: [(&str, &str); N], value: f64) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            value,
        }
    }
}

/// Samples returned by an instant query, with non-fatal backend warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub samples: Vec<Sample>,
    pub warnings: Vec<String>,
}
