//! Grafana HTTP client with timeout and optional mutual TLS.
//!
//! # Responsibilities
//! - Build the shared reqwest client (CA bundle, client identity, timeout)
//! - Health check the Grafana endpoint
//! - Resolve datasource proxy URLs relative to the configured base URL

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::config::Datasource;
use crate::monitoring::types::{MonitoringError, MonitoringResult};

/// Deadline applied to every request made by the client.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for one Grafana stack.
#[derive(Clone)]
pub struct MonitoringClient {
    http: reqwest::Client,
    base: Url,
    datasource: Datasource,
}

impl MonitoringClient {
    /// Create a client for the given stack.
    ///
    /// Fails if the URL is invalid or the TLS material cannot be loaded.
    pub fn new(datasource: &Datasource) -> MonitoringResult<Self> {
        let base = base_url(&datasource.monitoring_url)?;
        let http = build_http_client(datasource)?;

        tracing::debug!(
            url = %base,
            client_cert = datasource.monitoring_cert_path.is_some(),
            "Monitoring client initialized"
        );

        Ok(Self {
            http,
            base,
            datasource: datasource.clone(),
        })
    }

    pub fn datasource(&self) -> &Datasource {
        &self.datasource
    }

    /// Check that the monitoring endpoint is reachable and healthy.
    pub async fn ping(&self) -> MonitoringResult<()> {
        let url = self.base.join("api/health")?;

        let response = self.http.get(url).send().await.map_err(|e| {
            MonitoringError::Unavailable(format!("unable to query monitoring url: {}", e))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(MonitoringError::Unavailable(format!(
                "monitoring doesn't seem healthy: return code {}",
                status.as_u16()
            )));
        }

        tracing::debug!(url = %self.base, "Monitoring is healthy");
        Ok(())
    }

    /// URL of `path` behind the datasource proxy for datasource `index`.
    pub fn proxy_url(&self, index: u32, path: &str) -> MonitoringResult<Url> {
        Ok(self
            .base
            .join(&format!("api/datasources/proxy/{}/{}", index, path))?)
    }

    /// GET `url` with query parameters and return the status and raw body.
    pub(crate) async fn get(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> MonitoringResult<(StatusCode, String)> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Parse the base URL so that relative joins stay under its path.
pub fn base_url(raw: &str) -> MonitoringResult<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Fail with [`MonitoringError::Status`] unless `status` is a success.
pub(crate) fn ensure_success(status: StatusCode, body: &str) -> MonitoringResult<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(MonitoringError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

fn build_http_client(datasource: &Datasource) -> MonitoringResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(CLIENT_TIMEOUT);

    if let Some(ca_path) = &datasource.monitoring_ca_path {
        let pem = read_pem(ca_path)?;
        for certificate in reqwest::Certificate::from_pem_bundle(&pem)? {
            builder = builder.add_root_certificate(certificate);
        }
    }

    if let (Some(cert_path), Some(key_path)) = (
        &datasource.monitoring_cert_path,
        &datasource.monitoring_cert_key_path,
    ) {
        let mut pem = read_pem(cert_path)?;
        pem.push(b'\n');
        pem.extend(read_pem(key_path)?);
        builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
    }

    Ok(builder.build()?)
}

fn read_pem(path: &Path) -> MonitoringResult<Vec<u8>> {
    fs::read(path).map_err(|source| MonitoringError::Io {
        path: path.to_path_buf(),
        source,
    })
}
