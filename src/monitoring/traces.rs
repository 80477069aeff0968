//! Jaeger trace lookups through the datasource proxy.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::format_duration;
use crate::monitoring::client::{ensure_success, MonitoringClient};
use crate::monitoring::types::{MonitoringError, MonitoringResult};
use crate::monitoring::TraceSource;

/// Parameters of one trace search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceQuery {
    /// Window start in microseconds since the epoch.
    pub start: i64,
    /// Window end in microseconds since the epoch.
    pub end: i64,
    pub limit: u32,
    pub lookback: Duration,
    /// Zero means no lower bound.
    pub min_duration: Duration,
    pub max_duration: Option<Duration>,
    pub service: String,
    pub tags: BTreeMap<String, String>,
}

impl TraceQuery {
    /// Query string pairs for `api/traces`.
    pub fn to_query_pairs(&self) -> MonitoringResult<Vec<(&'static str, String)>> {
        let mut pairs = vec![
            ("start", self.start.to_string()),
            ("end", self.end.to_string()),
            ("limit", self.limit.to_string()),
            ("lookback", format_duration(self.lookback)),
        ];

        if !self.min_duration.is_zero() {
            pairs.push(("minDuration", format_duration(self.min_duration)));
        }
        if let Some(max) = self.max_duration {
            pairs.push(("maxDuration", format_duration(max)));
        }

        pairs.push(("service", self.service.clone()));

        if !self.tags.is_empty() {
            let tags = serde_json::to_string(&self.tags)
                .map_err(|e| MonitoringError::Encode(e.to_string()))?;
            pairs.push(("tags", tags));
        }

        Ok(pairs)
    }
}

#[derive(Debug, Deserialize)]
struct TracesResponse {
    #[serde(default)]
    data: Option<Vec<TraceSummary>>,
}

#[derive(Debug, Deserialize)]
struct TraceSummary {
    #[serde(rename = "traceID")]
    trace_id: String,
}

/// Extract trace ids from an `api/traces` response body.
pub fn decode_traces_response(body: &str) -> MonitoringResult<Vec<String>> {
    let response: TracesResponse =
        serde_json::from_str(body).map_err(|e| MonitoringError::Decode(e.to_string()))?;

    Ok(response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.trace_id)
        .collect())
}

#[async_trait]
impl TraceSource for MonitoringClient {
    async fn trace_ids(&self, query: &TraceQuery) -> MonitoringResult<Vec<String>> {
        let url = self.proxy_url(self.datasource().traces_index, "api/traces")?;
        let params = query.to_query_pairs()?;

        tracing::debug!(service = %query.service, tags = ?query.tags, "Searching traces");

        let (status, body) = self.get(url, &params).await?;
        ensure_success(status, &body)?;
        decode_traces_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> TraceQuery {
        TraceQuery {
            start: 1_603_386_000_000_000,
            end: 1_603_389_600_000_000,
            limit: 2,
            lookback: Duration::from_secs(3600),
            service: "squall".into(),
            ..Default::default()
        }
    }

    fn lookup<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_minimal_query_omits_optional_params() {
        let pairs = query().to_query_pairs().unwrap();
        assert_eq!(lookup(&pairs, "start"), Some("1603386000000000"));
        assert_eq!(lookup(&pairs, "end"), Some("1603389600000000"));
        assert_eq!(lookup(&pairs, "limit"), Some("2"));
        assert_eq!(lookup(&pairs, "lookback"), Some("3600s"));
        assert_eq!(lookup(&pairs, "service"), Some("squall"));
        assert!(lookup(&pairs, "minDuration").is_none());
        assert!(lookup(&pairs, "maxDuration").is_none());
        assert!(lookup(&pairs, "tags").is_none());
    }

    #[test]
    fn test_durations_and_tags_are_encoded() {
        let mut q = query();
        q.min_duration = Duration::from_millis(1500);
        q.max_duration = Some(Duration::from_secs(2));
        q.tags.insert("status.code".into(), "404".into());
        q.tags.insert("error".into(), "true".into());

        let pairs = q.to_query_pairs().unwrap();
        assert_eq!(lookup(&pairs, "minDuration"), Some("1500ms"));
        assert_eq!(lookup(&pairs, "maxDuration"), Some("2s"));
        assert_eq!(
            lookup(&pairs, "tags"),
            Some(r#"{"error":"true","status.code":"404"}"#)
        );
    }

    #[test]
    fn test_decode_trace_ids() {
        let body = r#"{"data": [{"traceID": "abc", "spans": []}, {"traceID": "def"}], "total": 2}"#;
        assert_eq!(decode_traces_response(body).unwrap(), vec!["abc", "def"]);

        assert!(decode_traces_response(r#"{"data": null}"#).unwrap().is_empty());
        assert!(decode_traces_response("{}").unwrap().is_empty());
        assert!(matches!(
            decode_traces_response("not json").unwrap_err(),
            MonitoringError::Decode(_)
        ));
    }
}
