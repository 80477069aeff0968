//! Loki log queries through the datasource proxy.

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::Deserialize;

use crate::monitoring::client::{ensure_success, MonitoringClient};
use crate::monitoring::types::{MonitoringError, MonitoringResult};

/// Order in which log lines are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

/// A `query_range` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// LogQL expression.
    pub query: String,
    /// Start in nanoseconds since the epoch.
    pub start: i64,
    /// End in nanoseconds since the epoch.
    pub end: i64,
    pub limit: u32,
    pub direction: Direction,
}

impl LogQuery {
    /// Build the LogQL expression from services and an optional filter.
    ///
    /// With services the result is `{app=~"a|b"} <filter>`, otherwise the
    /// filter is used as the whole expression.
    pub fn selector(services: &[String], filter: Option<&str>) -> String {
        let filter = filter.map(str::trim).unwrap_or_default();
        if services.is_empty() {
            return filter.to_string();
        }

        let selector = format!("{{app=~\"{}\"}}", services.join("|"));
        if filter.is_empty() {
            selector
        } else {
            format!("{} {}", selector, filter)
        }
    }

    fn to_query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("query", self.query.clone()),
            ("start", self.start.to_string()),
            ("end", self.end.to_string()),
            ("limit", self.limit.to_string()),
            ("direction", self.direction.as_str().to_string()),
        ]
    }
}

/// One log line with its stream labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp_ns: i64,
    pub labels: BTreeMap<String, String>,
    pub line: String,
}

#[derive(Debug, Deserialize)]
struct LokiResponse {
    status: String,
    #[serde(default)]
    data: Option<LokiData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LokiData {
    #[serde(rename = "resultType")]
    result_type: String,
    #[serde(default)]
    result: Vec<LokiStream>,
}

#[derive(Debug, Deserialize)]
struct LokiStream {
    #[serde(default)]
    stream: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<(String, String)>,
}

/// Flatten a `query_range` streams response, ordered by timestamp.
pub fn decode_logs_response(body: &str, direction: Direction) -> MonitoringResult<Vec<LogEntry>> {
    let response: LokiResponse =
        serde_json::from_str(body).map_err(|e| MonitoringError::Decode(e.to_string()))?;

    if response.status != "success" {
        return Err(MonitoringError::Query {
            error_type: response.status,
            message: response.error.unwrap_or_default(),
        });
    }

    let data = response
        .data
        .ok_or_else(|| MonitoringError::Decode("missing data".to_string()))?;
    if data.result_type != "streams" {
        return Err(MonitoringError::Decode(format!(
            "expected a streams result, got {}",
            data.result_type
        )));
    }

    let mut entries = Vec::new();
    for stream in data.result {
        for (ts, line) in stream.values {
            let timestamp_ns = ts
                .parse::<i64>()
                .map_err(|_| MonitoringError::Decode(format!("invalid timestamp {:?}", ts)))?;
            entries.push(LogEntry {
                timestamp_ns,
                labels: stream.stream.clone(),
                line,
            });
        }
    }

    match direction {
        Direction::Forward => entries.sort_by_key(|e| e.timestamp_ns),
        Direction::Backward => entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp_ns)),
    }
    Ok(entries)
}

impl MonitoringClient {
    /// Run a Loki range query.
    pub async fn query_logs(&self, query: &LogQuery) -> MonitoringResult<Vec<LogEntry>> {
        let url = self.proxy_url(self.datasource().logs_index, "loki/api/v1/query_range")?;

        tracing::debug!(
            url = %url,
            query = %query.query,
            start = query.start,
            end = query.end,
            limit = query.limit,
            direction = query.direction.as_str(),
            "Querying logs"
        );

        let (status, body) = self.get(url, &query.to_query_pairs()).await?;
        ensure_success(status, &body)?;
        decode_logs_response(&body, query.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selector() {
        assert_eq!(
            LogQuery::selector(&strings(&["squall", "cid"]), Some("|= \"error\"")),
            r#"{app=~"squall|cid"} |= "error""#
        );
        assert_eq!(
            LogQuery::selector(&strings(&["squall"]), None),
            r#"{app=~"squall"}"#
        );
        assert_eq!(
            LogQuery::selector(&[], Some(r#" {app="x"} |~ "timeout" "#)),
            r#"{app="x"} |~ "timeout""#
        );
        assert_eq!(LogQuery::selector(&[], None), "");
    }

    const BODY: &str = r#"{
        "status": "success",
        "data": {
            "resultType": "streams",
            "result": [
                {"stream": {"app": "squall", "pod": "squall-1"}, "values": [["300", "c"], ["100", "a"]]},
                {"stream": {"app": "cid", "pod": "cid-1"}, "values": [["200", "b"]]}
            ]
        }
    }"#;

    #[test]
    fn test_decode_forward() {
        let entries = decode_logs_response(BODY, Direction::Forward).unwrap();
        let lines: Vec<_> = entries.iter().map(|e| e.line.as_str()).collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert_eq!(entries[1].labels["pod"], "cid-1");
        assert_eq!(entries[0].timestamp_ns, 100);
    }

    #[test]
    fn test_decode_backward() {
        let entries = decode_logs_response(BODY, Direction::Backward).unwrap();
        let lines: Vec<_> = entries.iter().map(|e| e.line.as_str()).collect();
        assert_eq!(lines, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let body = r#"{"status": "success", "data": {"resultType": "streams",
            "result": [{"stream": {}, "values": [["soon", "x"]]}]}}"#;
        assert!(matches!(
            decode_logs_response(body, Direction::Forward).unwrap_err(),
            MonitoringError::Decode(_)
        ));
    }

    #[test]
    fn test_direction_names() {
        assert_eq!(Direction::Forward.as_str(), "forward");
        assert_eq!(Direction::Backward.as_str(), "backward");
        assert_eq!(Direction::default(), Direction::Forward);
    }
}
