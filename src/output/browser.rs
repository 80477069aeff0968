//! Opening a trace in Grafana Explore.

use std::io;
use std::process::{Command, Stdio};

use serde_json::json;
use url::Url;

use crate::monitoring::client::base_url;
use crate::monitoring::MonitoringResult;

/// Explore URL showing `trace` from the `datasource` traces datasource.
pub fn explore_url(monitoring_url: &str, datasource: &str, trace: &str) -> MonitoringResult<Url> {
    let mut url = base_url(monitoring_url)?.join("explore")?;
    let left = json!(["now-24h", "now", datasource, { "query": trace }]);
    url.query_pairs_mut()
        .append_pair("orgId", "1")
        .append_pair("left", &left.to_string());
    Ok(url)
}

/// Hand `url` to the platform opener.
pub fn open_in_browser(url: &Url) -> io::Result<()> {
    let status = opener(url.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("opener exited with {}", status)))
    }
}

#[cfg(target_os = "macos")]
fn opener(target: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(target);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(target: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", target]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(target: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(target);
    cmd
}
