//! API error metrics.
//!
//! # Responsibilities
//! - Build the two error queries (non-5xx deltas, new or increasing 500s)
//! - Query Prometheus through the datasource proxy and decode instant vectors
//! - Turn labeled samples into [`ErrorRecord`]s, dropping malformed ones

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::identity::{self, IdentityRegistry};
use crate::model::ErrorRecord;
use crate::monitoring::client::{ensure_success, MonitoringClient};
use crate::monitoring::types::{MonitoringError, MonitoringResult, QueryOutcome, Sample};
use crate::monitoring::MetricsSource;

/// Labels every sample must carry.
pub const REQUIRED_LABELS: [&str; 4] = ["code", "method", "url", "service"];

/// Why a sample was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleDecodeError {
    #[error("label {0:?} not found")]
    MissingLabel(&'static str),

    #[error("code {0:?} is not an integer")]
    InvalidCode(String),
}

/// Non-5xx, non-zero codes whose count moved during the window.
pub fn errors_query(since: Duration) -> String {
    format!(
        "sum(delta(http_requests_total{{code!~'0|500'}}[{s}s])) by (service,code,method,url) >0",
        s = since.as_secs()
    )
}

/// 500s seen for the first time, or more often, during the window.
pub fn server_errors_query(since: Duration) -> String {
    format!(
        "count((http_errors_5xx_total{{code='500'}} > 0 unless http_errors_5xx_total{{code='500'}} offset {s}s) \
         or ((http_errors_5xx_total{{code='500'}} - http_errors_5xx_total{{code='500'}} offset {s}s) >0)) \
         by (service,code,method,url) >0",
        s = since.as_secs()
    )
}

/// Run both error queries at `at` and concatenate their records.
pub async fn fetch_api_errors(
    source: &dyn MetricsSource,
    registry: &dyn IdentityRegistry,
    since: Duration,
    at: DateTime<Utc>,
) -> MonitoringResult<Vec<ErrorRecord>> {
    let mut records = Vec::new();

    for query in [errors_query(since), server_errors_query(since)] {
        let outcome = source.query(&query, at).await?;
        if !outcome.warnings.is_empty() {
            tracing::warn!(warnings = ?outcome.warnings, "Warnings while querying Prometheus");
        }

        let parsed = parse_samples(outcome.samples, registry);
        tracing::debug!(query = %query, results = parsed.len(), "Queried Prometheus");
        records.extend(parsed);
    }

    Ok(records)
}

/// Decode every sample, skipping the malformed ones.
pub fn parse_samples(samples: Vec<Sample>, registry: &dyn IdentityRegistry) -> Vec<ErrorRecord> {
    samples
        .iter()
        .filter_map(|sample| match decode_sample(sample, registry) {
            Ok(record) => Some(record),
            Err(e @ SampleDecodeError::MissingLabel(_)) => {
                tracing::debug!(error = %e, labels = ?sample.labels, "Unable to parse metric");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Unable to parse metric");
                None
            }
        })
        .collect()
}

/// Decode one sample. URL decoding problems only leave identity empty.
pub fn decode_sample(
    sample: &Sample,
    registry: &dyn IdentityRegistry,
) -> Result<ErrorRecord, SampleDecodeError> {
    let label = |name: &'static str| {
        sample
            .labels
            .get(name)
            .ok_or(SampleDecodeError::MissingLabel(name))
    };

    for name in REQUIRED_LABELS {
        label(name)?;
    }

    let raw_code = label("code")?;
    let code = raw_code
        .parse::<i32>()
        .map_err(|_| SampleDecodeError::InvalidCode(raw_code.clone()))?;

    let url = label("url")?;
    let method = label("method")?;

    let resolved = identity::resolve(url, method, registry).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Unable to extract identity from url");
        identity::Resolved::default()
    });

    Ok(ErrorRecord {
        code,
        service: label("service")?.clone(),
        identity: resolved.identity,
        operation: resolved.operation,
        method: method.clone(),
        url: url.clone(),
        count: sample.value as u64,
        traces: Vec::new(),
    })
}

/// Prometheus API envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VectorSample {
    #[serde(default)]
    metric: HashMap<String, String>,
    value: (f64, String),
}

/// Decode a Prometheus instant query response body.
pub fn decode_query_response(body: &str) -> MonitoringResult<QueryOutcome> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| MonitoringError::Decode(e.to_string()))?;

    if response.status != "success" {
        return Err(MonitoringError::Query {
            error_type: response.error_type.unwrap_or_else(|| "unknown".to_string()),
            message: response.error.unwrap_or_default(),
        });
    }

    let data = response
        .data
        .ok_or_else(|| MonitoringError::Decode("missing data".to_string()))?;
    if data.result_type != "vector" {
        return Err(MonitoringError::Decode(format!(
            "expected a vector result, got {}",
            data.result_type
        )));
    }

    let vector: Vec<VectorSample> =
        serde_json::from_value(data.result).map_err(|e| MonitoringError::Decode(e.to_string()))?;

    let samples = vector
        .into_iter()
        .filter_map(|s| match s.value.1.parse::<f64>() {
            Ok(value) => Some(Sample {
                labels: s.metric,
                value,
            }),
            Err(_) => {
                tracing::warn!(value = %s.value.1, labels = ?s.metric, "Dropping sample with a non numeric value");
                None
            }
        })
        .collect();

    Ok(QueryOutcome {
        samples,
        warnings: response.warnings,
    })
}

#[async_trait]
impl MetricsSource for MonitoringClient {
    async fn query(&self, query: &str, at: DateTime<Utc>) -> MonitoringResult<QueryOutcome> {
        let url = self.proxy_url(self.datasource().metrics_index, "api/v1/query")?;
        let params = [("query", query.to_string()), ("time", at.timestamp().to_string())];

        let (status, body) = self.get(url, &params).await?;

        // Prometheus reports query errors in the body with a 4xx/5xx status.
        match decode_query_response(&body) {
            Err(err @ MonitoringError::Decode(_)) => {
                ensure_success(status, &body)?;
                Err(err)
            }
            outcome => outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticRegistry;
    use crate::model::Operation;
    use std::sync::Mutex;

    fn registry() -> StaticRegistry {
        StaticRegistry::new(HashMap::from([(
            "namespaces".to_string(),
            "namespace".to_string(),
        )]))
    }

    fn sample(code: &str, method: &str, url: &str, service: &str, value: f64) -> Sample {
        Sample::new(
            [("code", code), ("method", method), ("url", url), ("service", service)],
            value,
        )
    }

    #[test]
    fn test_queries_embed_lookback() {
        let q = errors_query(Duration::from_secs(3600));
        assert_eq!(
            q,
            "sum(delta(http_requests_total{code!~'0|500'}[3600s])) by (service,code,method,url) >0"
        );

        let q = server_errors_query(Duration::from_secs(60));
        assert!(q.starts_with("count((http_errors_5xx_total{code='500'} > 0 unless"));
        assert_eq!(q.matches("offset 60s").count(), 2);
        assert!(q.ends_with("by (service,code,method,url) >0"));
    }

    #[test]
    fn test_decode_sample() {
        let s = sample("404", "GET", "/namespaces/abc", "squall-7f9", 3.9);
        let r = decode_sample(&s, &registry()).unwrap();
        assert_eq!(r.code, 404);
        assert_eq!(r.service, "squall-7f9");
        assert_eq!(r.identity, "namespace");
        assert_eq!(r.operation, Some(Operation::Retrieve));
        assert_eq!(r.method, "GET");
        assert_eq!(r.url, "/namespaces/abc");
        assert_eq!(r.count, 3);
        assert!(r.traces.is_empty());
    }

    #[test]
    fn test_missing_label_is_rejected() {
        for missing in REQUIRED_LABELS {
            let mut s = sample("404", "GET", "/namespaces", "squall", 1.0);
            s.labels.remove(missing);
            assert_eq!(
                decode_sample(&s, &registry()).unwrap_err(),
                SampleDecodeError::MissingLabel(missing)
            );
        }
    }

    #[test]
    fn test_non_integer_code_is_rejected() {
        let s = sample("4xx", "GET", "/namespaces", "squall", 1.0);
        assert_eq!(
            decode_sample(&s, &registry()).unwrap_err(),
            SampleDecodeError::InvalidCode("4xx".into())
        );
    }

    #[test]
    fn test_undecodable_url_keeps_sample() {
        let s = sample("500", "GET", "/a/b/c/d", "squall", 2.0);
        let r = decode_sample(&s, &registry()).unwrap();
        assert_eq!(r.identity, "");
        assert_eq!(r.operation, None);
        assert_eq!(r.count, 2);
    }

    #[test]
    fn test_negative_value_saturates() {
        let s = sample("500", "GET", "/namespaces", "squall", -4.0);
        assert_eq!(decode_sample(&s, &registry()).unwrap().count, 0);
    }

    #[test]
    fn test_parse_samples_drops_malformed() {
        let mut no_service = sample("404", "GET", "/namespaces", "x", 1.0);
        no_service.labels.remove("service");
        let samples = vec![
            sample("404", "GET", "/namespaces", "squall", 1.0),
            no_service,
            sample("abc", "GET", "/namespaces", "squall", 1.0),
            sample("500", "POST", "/", "cid", 5.0),
        ];
        let records = parse_samples(samples, &registry());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, 404);
        assert_eq!(records[1].code, 500);
        assert_eq!(records[1].operation, None);
    }

    #[test]
    fn test_decode_vector_response() {
        let body = r#"{
            "status": "success",
            "data": {
                "resultType": "vector",
                "result": [
                    {"metric": {"code": "404", "method": "GET", "url": "/a", "service": "s"}, "value": [1603389377.0, "2.5"]},
                    {"metric": {"code": "500"}, "value": [1603389377.0, "NaN"]},
                    {"metric": {"code": "503"}, "value": [1603389377.0, "oops"]}
                ]
            },
            "warnings": ["partial response"]
        }"#;
        let outcome = decode_query_response(body).unwrap();
        assert_eq!(outcome.samples.len(), 2);
        assert_eq!(outcome.samples[0].value, 2.5);
        assert_eq!(outcome.samples[0].labels["url"], "/a");
        assert!(outcome.samples[1].value.is_nan());
        assert_eq!(outcome.warnings, vec!["partial response"]);
    }

    #[test]
    fn test_decode_error_response() {
        let body = r#"{"status": "error", "errorType": "bad_data", "error": "parse error at char 4"}"#;
        match decode_query_response(body).unwrap_err() {
            MonitoringError::Query {
                error_type,
                message,
            } => {
                assert_eq!(error_type, "bad_data");
                assert_eq!(message, "parse error at char 4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_rejects_matrix() {
        let body = r#"{"status": "success", "data": {"resultType": "matrix", "result": []}}"#;
        assert!(matches!(
            decode_query_response(body).unwrap_err(),
            MonitoringError::Decode(_)
        ));
    }

    /// Serves canned outcomes in call order and records the queries.
    struct ScriptedSource {
        outcomes: Mutex<Vec<MonitoringResult<QueryOutcome>>>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MetricsSource for ScriptedSource {
        async fn query(&self, query: &str, _at: DateTime<Utc>) -> MonitoringResult<QueryOutcome> {
            self.queries.lock().unwrap().push(query.to_string());
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn test_fetch_concatenates_both_queries() {
        let source = ScriptedSource {
            outcomes: Mutex::new(vec![
                Ok(QueryOutcome {
                    samples: vec![sample("404", "GET", "/namespaces", "squall", 1.0)],
                    warnings: vec!["slow".into()],
                }),
                Ok(QueryOutcome {
                    samples: vec![
                        sample("500", "GET", "/namespaces", "squall", 1.0),
                        sample("404", "GET", "/namespaces", "squall", 9.0),
                    ],
                    warnings: vec![],
                }),
            ]),
            queries: Mutex::new(Vec::new()),
        };

        let records = fetch_api_errors(&source, &registry(), Duration::from_secs(600), Utc::now())
            .await
            .unwrap();

        // No dedup at this stage.
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].code, 404);
        assert_eq!(records[1].code, 500);

        let queries = source.queries.lock().unwrap();
        assert_eq!(queries[0], errors_query(Duration::from_secs(600)));
        assert_eq!(queries[1], server_errors_query(Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_fetch_fails_when_a_query_fails() {
        let source = ScriptedSource {
            outcomes: Mutex::new(vec![
                Ok(QueryOutcome::default()),
                Err(MonitoringError::Decode("boom".into())),
            ]),
            queries: Mutex::new(Vec::new()),
        };

        let result =
            fetch_api_errors(&source, &registry(), Duration::from_secs(60), Utc::now()).await;
        assert!(result.is_err());
    }
}
