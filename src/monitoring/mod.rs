//! Monitoring stack access.
//!
//! # Data Flow
//! ```text
//! MonitoringClient (client.rs)
//!     → GET api/health                                  (ping)
//!     → api/datasources/proxy/{metrics}/api/v1/query    (metrics.rs, Prometheus)
//!     → api/datasources/proxy/{traces}/api/traces       (traces.rs, Jaeger)
//!     → api/datasources/proxy/{logs}/loki/api/v1/...    (logs.rs, Loki)
//! ```
//!
//! # Design Decisions
//! - Every backend is reached through the Grafana datasource proxy
//! - One shared reqwest client, one bounded timeout, no retries
//! - Metrics and traces are consumed through the [`MetricsSource`] and
//!   [`TraceSource`] traits so the pipeline can run against fakes

pub mod client;
pub mod logs;
pub mod metrics;
pub mod traces;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use client::MonitoringClient;
pub use logs::{Direction, LogEntry, LogQuery};
pub use metrics::{fetch_api_errors, parse_samples, SampleDecodeError};
pub use traces::TraceQuery;
pub use types::{MonitoringError, MonitoringResult, QueryOutcome, Sample};

/// Evaluates instant queries against a metrics backend.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn query(&self, query: &str, at: DateTime<Utc>) -> MonitoringResult<QueryOutcome>;
}

/// Looks up example trace ids in a tracing backend.
#[async_trait]
pub trait TraceSource: Send + Sync {
    async fn trace_ids(&self, query: &TraceQuery) -> MonitoringResult<Vec<String>>;
}
