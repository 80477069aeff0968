//! Trace correlation.
//!
//! # Data Flow
//! ```text
//! filtered records
//!     → one TraceQuery per record (service prefix + status/identity/operation tags)
//!     → one tokio task per record, joined before any read
//!     → traces written back by position
//!     → post-filter when the search was narrowed
//! ```
//!
//! # Design Decisions
//! - A failed or panicked lookup leaves its record without traces
//! - No bounded pool, no retries; the client timeout bounds each lookup

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::config::TimeWindow;
use crate::model::ErrorRecord;
use crate::monitoring::{TraceQuery, TraceSource};

/// Search settings shared by every lookup of a run.
#[derive(Debug, Clone)]
pub struct CorrelationSettings {
    pub window: TimeWindow,
    pub limit: u32,
    pub min_duration: Duration,
    pub namespace: Option<String>,
    pub errors_only: bool,
}

impl CorrelationSettings {
    /// True when the search is narrower than "any trace for this record".
    pub fn narrows(&self) -> bool {
        self.errors_only
            || !self.min_duration.is_zero()
            || self.namespace.as_deref().is_some_and(|ns| !ns.is_empty())
    }
}

/// Attaches example trace ids to error records.
pub struct TraceCorrelator {
    source: Arc<dyn TraceSource>,
    settings: CorrelationSettings,
}

impl TraceCorrelator {
    pub fn new(source: Arc<dyn TraceSource>, settings: CorrelationSettings) -> Self {
        Self { source, settings }
    }

    /// Build the trace search for one record.
    pub fn query_for(&self, record: &ErrorRecord) -> TraceQuery {
        let settings = &self.settings;

        let mut tags = BTreeMap::from([
            ("status.code".to_string(), record.code.to_string()),
            ("req.identity".to_string(), record.identity.clone()),
            (
                "req.operation".to_string(),
                record.operation_name().to_string(),
            ),
        ]);
        if settings.errors_only {
            tags.insert("error".to_string(), "true".to_string());
        }
        if let Some(namespace) = settings.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            tags.insert("req.namespace".to_string(), namespace.to_string());
        }

        TraceQuery {
            start: settings.window.start_micros(),
            end: settings.window.end_micros(),
            limit: settings.limit,
            lookback: settings.window.since,
            min_duration: settings.min_duration,
            max_duration: None,
            service: service_name(&record.service).to_string(),
            tags,
        }
    }

    /// Look up traces for every record concurrently.
    pub async fn correlate(&self, mut records: Vec<ErrorRecord>) -> Vec<ErrorRecord> {
        let handles: Vec<_> = records
            .iter()
            .map(|record| {
                let source = Arc::clone(&self.source);
                let query = self.query_for(record);
                tokio::spawn(async move { source.trace_ids(&query).await })
            })
            .collect();

        let results = join_all(handles).await;

        for (record, result) in records.iter_mut().zip(results) {
            match result {
                Ok(Ok(traces)) => record.traces = traces,
                Ok(Err(e)) => {
                    tracing::error!(
                        error = %e,
                        service = %record.service,
                        code = record.code,
                        url = %record.url,
                        "Unable to retrieve traces"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, url = %record.url, "Trace lookup task failed");
                }
            }
        }

        if self.settings.narrows() {
            keep_traced(records)
        } else {
            records
        }
    }
}

/// Drop records without traces and count the traces instead of the errors.
pub fn keep_traced(records: Vec<ErrorRecord>) -> Vec<ErrorRecord> {
    records
        .into_iter()
        .filter(|r| !r.traces.is_empty())
        .map(|mut r| {
            r.count = r.traces.len() as u64;
            r
        })
        .collect()
}

/// Tracing service name: the part before the first `-`.
pub fn service_name(service: &str) -> &str {
    service.split('-').next().unwrap_or(service)
}
