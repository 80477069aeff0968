//! Profile file schema.
//!
//! A profile file lists named stacks, each pointing at a Grafana instance
//! and at the datasource ids of its metrics, logs and traces backends.
//!
//! ```toml
//! [[datasources]]
//! name = "prod"
//! monitoring_url = "https://grafana.prod.example.com"
//! metrics_index = 4
//! traces_datasource_name = "prod-traces"
//! monitoring_ca_path = "~/.tracer/prod-ca.pem"
//!
//! [identities]
//! processingunits = "processingunit"
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Datasource id of the metrics backend when none is configured.
pub const DEFAULT_METRICS_INDEX: u32 = 1;

/// Name of the synthesized stack.
pub const DEFAULT_STACK: &str = "default";

/// Grafana datasource name used by the synthesized stack.
pub const DEFAULT_TRACES_DATASOURCE: &str = "platform-traces";

/// Root of a profile file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Profiles {
    /// Available stacks.
    pub datasources: Vec<Datasource>,

    /// Path category to resource identity table.
    pub identities: HashMap<String, String>,
}

impl Profiles {
    pub fn names(&self) -> Vec<String> {
        self.datasources.iter().map(|d| d.name.clone()).collect()
    }
}

/// One stack: a Grafana instance and its datasource ids.
///
/// An index of 0 means "not set" and is replaced by
/// [`Datasource::with_index_defaults`].
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Datasource {
    pub name: String,

    /// Base URL of the Grafana instance proxying every backend.
    pub monitoring_url: String,

    /// Prometheus datasource id.
    pub metrics_index: u32,

    /// Loki datasource id.
    pub logs_index: u32,

    /// Jaeger datasource id.
    pub traces_index: u32,

    /// Jaeger datasource name, used to build explore links.
    pub traces_datasource_name: String,

    /// Extra CA bundle (PEM) trusted for the Grafana endpoint.
    pub monitoring_ca_path: Option<PathBuf>,

    /// Client certificate (PEM).
    pub monitoring_cert_path: Option<PathBuf>,

    /// Client certificate key (unencrypted PEM).
    pub monitoring_cert_key_path: Option<PathBuf>,
}

impl Datasource {
    /// Fill unset indices: logs follow metrics, traces follow logs.
    pub fn with_index_defaults(mut self) -> Self {
        if self.logs_index == 0 {
            self.logs_index = if self.metrics_index == 0 {
                DEFAULT_METRICS_INDEX + 1
            } else {
                self.metrics_index + 1
            };
        }

        if self.traces_index == 0 {
            self.traces_index = if self.metrics_index == 0 {
                DEFAULT_METRICS_INDEX + 2
            } else {
                self.metrics_index + 2
            };
        }

        if self.metrics_index == 0 {
            self.metrics_index = DEFAULT_METRICS_INDEX;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_defaults_without_metrics() {
        let ds = Datasource::default().with_index_defaults();
        assert_eq!(ds.metrics_index, 1);
        assert_eq!(ds.logs_index, 2);
        assert_eq!(ds.traces_index, 3);
    }

    #[test]
    fn test_index_defaults_follow_metrics() {
        let ds = Datasource {
            metrics_index: 7,
            ..Default::default()
        }
        .with_index_defaults();
        assert_eq!(ds.metrics_index, 7);
        assert_eq!(ds.logs_index, 8);
        assert_eq!(ds.traces_index, 9);
    }

    #[test]
    fn test_explicit_indices_are_kept() {
        let ds = Datasource {
            metrics_index: 4,
            logs_index: 10,
            traces_index: 12,
            ..Default::default()
        }
        .with_index_defaults();
        assert_eq!((ds.metrics_index, ds.logs_index, ds.traces_index), (4, 10, 12));
    }

    #[test]
    fn test_deserialize_profile() {
        let raw = r#"
            [[datasources]]
            name = "prod"
            monitoring_url = "https://grafana.example.com"
            metrics_index = 4
            monitoring_ca_path = "/etc/tracer/ca.pem"

            [[datasources]]
            name = "staging"

            [identities]
            namespaces = "namespace"
        "#;
        let profiles: Profiles = toml::from_str(raw).unwrap();
        assert_eq!(profiles.names(), vec!["prod", "staging"]);
        assert_eq!(profiles.datasources[0].metrics_index, 4);
        assert_eq!(
            profiles.datasources[0].monitoring_ca_path,
            Some(PathBuf::from("/etc/tracer/ca.pem"))
        );
        assert_eq!(profiles.datasources[1].monitoring_url, "");
        assert_eq!(profiles.identities["namespaces"], "namespace");
    }
}
