//! Shared utilities for integration tests: a mock Grafana and response builders.

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::{json, Value};
use tracer::config::Datasource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a mock Grafana whose health endpoint answers 200.
pub async fn start_grafana() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database": "ok"})))
        .mount(&server)
        .await;
    server
}

/// Datasource pointing at `server` with default indices (1, 2, 3).
pub fn datasource(server: &MockServer) -> Datasource {
    Datasource {
        name: "test".into(),
        monitoring_url: server.uri(),
        traces_datasource_name: "test-traces".into(),
        ..Default::default()
    }
    .with_index_defaults()
}

/// Proxy path of `endpoint` on datasource `index`.
pub fn proxy_path(index: u32, endpoint: &str) -> String {
    format!("/api/datasources/proxy/{}/{}", index, endpoint)
}

/// Labels of an API error sample.
pub fn labels(code: &str, method: &str, url: &str, service: &str) -> Value {
    json!({"code": code, "method": method, "url": url, "service": service})
}

/// Successful Prometheus instant vector response.
pub fn prom_vector(samples: &[(Value, &str)]) -> Value {
    let result: Vec<Value> = samples
        .iter()
        .map(|(metric, value)| json!({"metric": metric, "value": [1603389377.0, value]}))
        .collect();
    json!({"status": "success", "data": {"resultType": "vector", "result": result}})
}

/// Jaeger `api/traces` response with the given trace ids.
pub fn jaeger_traces(ids: &[&str]) -> Value {
    let data: Vec<Value> = ids
        .iter()
        .map(|id| json!({"traceID": id, "spans": [], "processes": {}}))
        .collect();
    json!({"data": data, "total": 0, "limit": 0, "offset": 0, "errors": null})
}

/// Loki `query_range` response with one stream.
pub fn loki_stream(pod: &str, values: &[(&str, &str)]) -> Value {
    let values: Vec<Value> = values.iter().map(|(ts, line)| json!([ts, line])).collect();
    json!({
        "status": "success",
        "data": {
            "resultType": "streams",
            "result": [{"stream": {"app": "squall", "pod": pod}, "values": values}]
        }
    })
}

/// Write a profile file with one `test` stack pointing at `server`.
pub fn write_profile(dir: &tempfile::TempDir, server: &MockServer) -> PathBuf {
    let profile = format!(
        r#"
[[datasources]]
name = "test"
monitoring_url = "{}"
traces_datasource_name = "test-traces"

[identities]
namespaces = "namespace"
processingunits = "processingunit"
"#,
        server.uri()
    );
    let path = dir.path().join("profile.toml");
    std::fs::write(&path, profile).unwrap();
    path
}
